use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// actions a user can trigger through a /start deep link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAction {
    JoinGiveaway(i32),
    CheckGiveaway(i32),
}

const JOIN_PREFIX: &str = "join_giveaway_";
const CHECK_PREFIX: &str = "checkgive_";

/// encodes a giveaway id into an opaque URL-safe token.
/// not security-sensitive, just hides the sequential ids from casual readers.
pub fn encode_giveaway_id(giveaway_id: i32) -> String {
    URL_SAFE_NO_PAD.encode(giveaway_id.to_string())
}

pub fn decode_giveaway_id(token: &str) -> Option<i32> {
    let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.parse::<i32>().ok()
}

/// parses the payload of a `/start <args>` message into a deep-link action
pub fn parse_start_args(args: &str) -> Option<StartAction> {
    if let Some(token) = args.strip_prefix(JOIN_PREFIX) {
        return decode_giveaway_id(token).map(StartAction::JoinGiveaway);
    }
    if let Some(token) = args.strip_prefix(CHECK_PREFIX) {
        return decode_giveaway_id(token).map(StartAction::CheckGiveaway);
    }
    None
}

pub fn bot_start_link(bot_username: &str) -> String {
    format!("https://t.me/{}?start=", bot_username)
}

pub fn join_link(bot_username: &str, giveaway_id: i32) -> String {
    format!(
        "{}{}{}",
        bot_start_link(bot_username),
        JOIN_PREFIX,
        encode_giveaway_id(giveaway_id)
    )
}

pub fn verify_link(bot_username: &str, giveaway_id: i32) -> String {
    format!(
        "{}{}{}",
        bot_start_link(bot_username),
        CHECK_PREFIX,
        encode_giveaway_id(giveaway_id)
    )
}

/// builds the public https://t.me/c/... url for a message in a channel.
/// telegram channel ids carry a -100 prefix that the web links drop.
pub fn post_url(chat_id: i64, message_id: i32) -> String {
    let id_str = chat_id.to_string();
    let clear = if let Some(stripped) = id_str.strip_prefix("-100") {
        stripped.to_string()
    } else if let Some(stripped) = id_str.strip_prefix('-') {
        stripped.to_string()
    } else {
        id_str
    };
    format!("https://t.me/c/{}/{}", clear, message_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_ids() {
        for id in [0, 1, 7, 42, 1000, i32::MAX] {
            let token = encode_giveaway_id(id);
            assert_eq!(decode_giveaway_id(&token), Some(id));
            // tokens must survive being embedded in a URL untouched
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode_giveaway_id("not base64!!"), None);
        assert_eq!(decode_giveaway_id(""), None);
        // valid base64 but not a number
        assert_eq!(decode_giveaway_id(&URL_SAFE_NO_PAD.encode("abc")), None);
    }

    #[test]
    fn parse_start_args_routes_actions() {
        let token = encode_giveaway_id(17);
        assert_eq!(
            parse_start_args(&format!("join_giveaway_{}", token)),
            Some(StartAction::JoinGiveaway(17))
        );
        assert_eq!(
            parse_start_args(&format!("checkgive_{}", token)),
            Some(StartAction::CheckGiveaway(17))
        );
        assert_eq!(parse_start_args("somethingelse"), None);
    }

    #[test]
    fn post_url_strips_channel_prefix() {
        assert_eq!(post_url(-1001234567890, 5), "https://t.me/c/1234567890/5");
        assert_eq!(post_url(-4567, 2), "https://t.me/c/4567/2");
    }
}
