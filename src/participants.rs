use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// how long a finished giveaway's participant list stays queryable
pub const RETENTION: Duration = Duration::days(7);

struct ParticipantSet {
    // join order matters for display and last_n queries
    members: Vec<i64>,
    expires_at: Option<DateTime<Utc>>,
}

impl ParticipantSet {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

/// in-memory participant membership per giveaway.
///
/// single-process design: the join flow and the scheduler share this store,
/// but each giveaway is an independent key so there is no cross-giveaway
/// contention. expiry is lazy — expired sets are dropped on the next access.
#[derive(Clone)]
pub struct ParticipantStore {
    sets: Arc<Mutex<HashMap<i32, ParticipantSet>>>,
}

impl Default for ParticipantStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticipantStore {
    pub fn new() -> Self {
        Self {
            sets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// initializes an empty set; called once when a giveaway is published
    pub async fn create(&self, giveaway_id: i32) {
        let mut sets = self.sets.lock().await;
        sets.insert(
            giveaway_id,
            ParticipantSet {
                members: Vec::new(),
                expires_at: None,
            },
        );
    }

    /// adds a participant, returning whether they were newly added.
    /// false means "already joined" and must not trigger a second greeting.
    pub async fn add(&self, giveaway_id: i32, user_id: i64) -> bool {
        let mut sets = self.sets.lock().await;
        self.drop_if_expired(&mut sets, giveaway_id);
        let set = sets.entry(giveaway_id).or_insert_with(|| ParticipantSet {
            members: Vec::new(),
            expires_at: None,
        });
        if set.members.contains(&user_id) {
            return false;
        }
        set.members.push(user_id);
        true
    }

    pub async fn contains(&self, giveaway_id: i32, user_id: i64) -> bool {
        let mut sets = self.sets.lock().await;
        self.drop_if_expired(&mut sets, giveaway_id);
        sets.get(&giveaway_id)
            .map(|set| set.members.contains(&user_id))
            .unwrap_or(false)
    }

    pub async fn count(&self, giveaway_id: i32) -> usize {
        let mut sets = self.sets.lock().await;
        self.drop_if_expired(&mut sets, giveaway_id);
        sets.get(&giveaway_id).map(|set| set.members.len()).unwrap_or(0)
    }

    /// participants in join order; None once the set expired or never existed
    pub async fn members(&self, giveaway_id: i32) -> Option<Vec<i64>> {
        let mut sets = self.sets.lock().await;
        self.drop_if_expired(&mut sets, giveaway_id);
        sets.get(&giveaway_id).map(|set| set.members.clone())
    }

    pub async fn last_n(&self, giveaway_id: i32, n: usize) -> Vec<i64> {
        let mut sets = self.sets.lock().await;
        self.drop_if_expired(&mut sets, giveaway_id);
        match sets.get(&giveaway_id) {
            Some(set) => {
                let start = set.members.len().saturating_sub(n);
                set.members[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// schedules removal of the set after `ttl`; invoked at finish time.
    /// a storage-cost control, not a correctness requirement.
    pub async fn expire(&self, giveaway_id: i32, ttl: Duration) {
        let mut sets = self.sets.lock().await;
        if let Some(set) = sets.get_mut(&giveaway_id) {
            set.expires_at = Some(Utc::now() + ttl);
        }
    }

    /// removes the set immediately (deleted giveaways)
    pub async fn remove(&self, giveaway_id: i32) {
        let mut sets = self.sets.lock().await;
        sets.remove(&giveaway_id);
    }

    fn drop_if_expired(&self, sets: &mut HashMap<i32, ParticipantSet>, giveaway_id: i32) {
        let now = Utc::now();
        if sets
            .get(&giveaway_id)
            .map(|set| set.is_expired(now))
            .unwrap_or(false)
        {
            sets.remove(&giveaway_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_is_idempotent() {
        let store = ParticipantStore::new();
        store.create(1).await;
        assert!(store.add(1, 100).await);
        assert!(!store.add(1, 100).await, "second join must report duplicate");
        assert_eq!(store.count(1).await, 1);
    }

    #[tokio::test]
    async fn members_preserve_join_order() {
        let store = ParticipantStore::new();
        store.create(1).await;
        for user in [5, 3, 9] {
            store.add(1, user).await;
        }
        assert_eq!(store.members(1).await, Some(vec![5, 3, 9]));
        assert_eq!(store.last_n(1, 2).await, vec![3, 9]);
        assert_eq!(store.last_n(1, 10).await, vec![5, 3, 9]);
    }

    #[tokio::test]
    async fn expired_sets_report_unavailable() {
        let store = ParticipantStore::new();
        store.create(1).await;
        store.add(1, 100).await;
        // already past its deadline
        store.expire(1, Duration::seconds(-1)).await;
        assert_eq!(store.members(1).await, None);
        assert_eq!(store.count(1).await, 0);
        assert!(!store.contains(1, 100).await);
    }

    #[tokio::test]
    async fn future_expiry_keeps_set_readable() {
        let store = ParticipantStore::new();
        store.create(1).await;
        store.add(1, 100).await;
        store.expire(1, RETENTION).await;
        assert_eq!(store.members(1).await, Some(vec![100]));
    }

    #[tokio::test]
    async fn giveaways_are_independent_keys() {
        let store = ParticipantStore::new();
        store.create(1).await;
        store.create(2).await;
        store.add(1, 100).await;
        assert_eq!(store.count(2).await, 0);
        store.remove(1).await;
        assert_eq!(store.members(1).await, None);
    }
}
