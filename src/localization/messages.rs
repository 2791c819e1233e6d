use chrono::{DateTime, Duration, Utc};

use crate::creation::format_user_datetime;
use crate::giveaway::GiveawayStatus;

/// supported languages for the bot UI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    En,
    #[default]
    Ru,
}

impl Lang {
    /// creates Lang from Telegram's language_code (e.g., "ru", "en", "uk")
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("ru") => Lang::Ru,
            Some(_) => Lang::En,
            None => Lang::default(),
        }
    }
}

// =============================================================================
// Join flow
// =============================================================================

impl Lang {
    pub fn giveaway_not_found(&self) -> &'static str {
        match self {
            Lang::En => "Giveaway not found.",
            Lang::Ru => "Розыгрыш не найден.",
        }
    }

    pub fn giveaway_already_finished(&self) -> &'static str {
        match self {
            Lang::En => "This giveaway has already finished.",
            Lang::Ru => "Розыгрыш уже завершён.",
        }
    }

    pub fn already_joined(&self) -> &'static str {
        match self {
            Lang::En => "❗️You are already taking part in this giveaway.",
            Lang::Ru => "❗️Вы уже участвуете в этом розыгрыше.",
        }
    }

    pub fn must_subscribe(&self, channel_links: &str) -> String {
        match self {
            Lang::En => format!(
                "To take part in the giveaway <b><u>you have to subscribe</u></b> to all \
                 the channels from the conditions:\n\n{}",
                channel_links
            ),
            Lang::Ru => format!(
                "Чтобы участвовать в розыгрыше, <b><u>Вам необходимо подписаться</u></b> \
                 на все указанные каналы в условиях:\n\n{}",
                channel_links
            ),
        }
    }

    pub fn captcha_intro(&self) -> &'static str {
        match self {
            Lang::En => {
                "❗️<b>Before you become a participant we have to make sure you are not a bot.</b>"
            }
            Lang::Ru => {
                "❗️<b>Перед тем, как Вы станете участником розыгрыша, Мы должны убедиться, \
                 что Вы не бот.</b>"
            }
        }
    }

    pub fn captcha_prompt(&self) -> &'static str {
        match self {
            Lang::En => {
                "❓What digits do you see in the picture? Send the answer to the bot!\n\n\
                 <b>To give up on joining press</b> /cancel"
            }
            Lang::Ru => {
                "❓Какие числа Вы видите на картинке? Отправьте боту ответ!\n\n\
                 <b>Для отказа от участия в розыгрыше нажмите</b> /cancel"
            }
        }
    }

    pub fn captcha_passed(&self) -> &'static str {
        match self {
            Lang::En => "✅ Captcha solved!",
            Lang::Ru => "✅ Капча пройдена успешно!",
        }
    }

    pub fn captcha_wrong(&self, attempts_left: u8) -> String {
        match self {
            Lang::En => format!(
                "Wrong captcha text. Try again. Attempts left: {}",
                attempts_left
            ),
            Lang::Ru => format!(
                "Неправильный текст капчи. Попробуйте еще раз. Осталось попыток: {}",
                attempts_left
            ),
        }
    }

    pub fn captcha_exhausted(&self) -> &'static str {
        match self {
            Lang::En => "You are out of attempts. Try again later.",
            Lang::Ru => "Вы исчерпали все попытки. Попробуйте снова позже.",
        }
    }

    pub fn joined(&self, giveaway_id: i32) -> String {
        match self {
            Lang::En => format!(
                "🎉 <b>Congratulations!</b>\n<b>You are now taking part in giveaway #{}!</b>",
                giveaway_id
            ),
            Lang::Ru => format!(
                "🎉 <b>Поздравляем!</b>\n<b>Теперь Вы участник розыгрыша #{}!</b>",
                giveaway_id
            ),
        }
    }
}

// =============================================================================
// Giveaway post & results
// =============================================================================

impl Lang {
    pub fn conditions_header(&self) -> &'static str {
        match self {
            Lang::En => "\n\n<b>Conditions of participation:</b>\n\n",
            Lang::Ru => "\n\n<b>Условия участия:</b>\n\n",
        }
    }

    pub fn subscribe_condition(&self, channel_link: &str) -> String {
        match self {
            Lang::En => format!("✅ Subscribe to {}\n", channel_link),
            Lang::Ru => format!("✅ Подпишись на {}\n", channel_link),
        }
    }

    pub fn subscribe_condition_unavailable(&self) -> &'static str {
        match self {
            Lang::En => "✅ Subscribe to (the bot was removed from the channel)\n",
            Lang::Ru => "✅ Подпишись на (бота удалили из канала)\n",
        }
    }

    pub fn results_at_time(&self, end_at: DateTime<Utc>) -> String {
        match self {
            Lang::En => format!(
                "\nGiveaway results: <b>{}</b>\n\n",
                format_user_datetime(end_at)
            ),
            Lang::Ru => format!(
                "\nРезультаты розыгрыша: <b>{}</b>\n\n",
                format_user_datetime(end_at)
            ),
        }
    }

    pub fn results_at_count(&self, end_count: i32) -> String {
        match self {
            Lang::En => format!(
                "\nResults will be drawn once <b>{} participant(s)</b> joined\n\n",
                end_count
            ),
            Lang::Ru => format!(
                "\nРезультаты розыгрыша будут при достижении <b>{} участника(ов)</b>\n\n",
                end_count
            ),
        }
    }

    pub fn finished_no_participants(&self) -> &'static str {
        match self {
            Lang::En => "The giveaway is over, but there were no participants.",
            Lang::Ru => "Розыгрыш завершен, но участников нет.",
        }
    }

    pub fn finished_with_winners(&self, winner_mentions: &str) -> String {
        match self {
            Lang::En => format!("The giveaway is over!\n\nWinners:\n{}\n\n", winner_mentions),
            Lang::Ru => format!(
                "Розыгрыш завершен!\n\nПобедители:\n{}\n\n",
                winner_mentions
            ),
        }
    }

    pub fn finished_no_eligible(&self) -> &'static str {
        match self {
            Lang::En => "The giveaway is over, but nobody met the conditions.\n\n",
            Lang::Ru => "Розыгрыш завершен, но подходящих победителей нет.\n\n",
        }
    }

    pub fn verify_results_label(&self) -> &'static str {
        match self {
            Lang::En => "Check the results",
            Lang::Ru => "Проверить результаты",
        }
    }

    pub fn winner_congrats(&self, post_url: &str, verify_link: &str) -> String {
        match self {
            Lang::En => format!(
                "🎉🎉Congratulations🎉🎉\n\n\
                 You won the <a href='{}'>giveaway</a>!🎁\nThanks for taking part!\n\n{}",
                post_url, verify_link
            ),
            Lang::Ru => format!(
                "🎉🎉Поздравляем🎉🎉\n\n\
                 Вы стали победителем <a href='{}'>розыгрыша</a>!🎁\nБлагодарим за участие!\n\n{}",
                post_url, verify_link
            ),
        }
    }
}

// =============================================================================
// Creator notifications
// =============================================================================

impl Lang {
    pub fn publish_notification(&self, giveaway_id: i32, post_url: &str) -> String {
        match self {
            Lang::En => format!(
                "Giveaway #{} is published!\n<a href='{}'>Link to the giveaway</a>",
                giveaway_id, post_url
            ),
            Lang::Ru => format!(
                "Розыгрыш #{} опубликован!\n<a href='{}'>Ссылка на розыгрыш</a>",
                giveaway_id, post_url
            ),
        }
    }

    pub fn finish_notification(&self, giveaway_id: i32, results_url: &str) -> String {
        match self {
            Lang::En => format!(
                "Giveaway #{} has finished!\n<a href='{}'>Link to the results</a>",
                giveaway_id, results_url
            ),
            Lang::Ru => format!(
                "Розыгрыш #{} завершён!\n<a href='{}'>Ссылка на результаты</a>",
                giveaway_id, results_url
            ),
        }
    }

    pub fn publish_failed(&self, giveaway_id: i32, reason: &str) -> String {
        match self {
            Lang::En => format!(
                "❌ Giveaway #{} could not be posted and was removed: {}",
                giveaway_id, reason
            ),
            Lang::Ru => format!(
                "❌ Розыгрыш #{} не удалось опубликовать, он был удалён: {}",
                giveaway_id, reason
            ),
        }
    }

    pub fn home_channel_removed(&self) -> &'static str {
        match self {
            Lang::En => {
                "The bot lost its admin rights, so your channel's giveaways were removed."
            }
            Lang::Ru => {
                "Так как бота убрали из списка администраторов, Ваш канал и связанные с ним \
                 розыгрыши были удалены."
            }
        }
    }

    pub fn sponsor_channel_removed(&self, giveaway_id: i32) -> String {
        match self {
            Lang::En => format!(
                "A sponsor channel of giveaway #{} became unavailable and was removed \
                 from its conditions.",
                giveaway_id
            ),
            Lang::Ru => format!(
                "Спонсорский канал розыгрыша #{} стал недоступен и был убран из его условий.",
                giveaway_id
            ),
        }
    }

    pub fn post_deleted_notice(&self, giveaway_id: i32) -> String {
        match self {
            Lang::En => format!(
                "The post of giveaway #{} was deleted, so the giveaway was closed without \
                 drawing winners.",
                giveaway_id
            ),
            Lang::Ru => format!(
                "Пост розыгрыша #{} был удалён, поэтому розыгрыш закрыт без выбора победителей.",
                giveaway_id
            ),
        }
    }
}

// =============================================================================
// Owner menu (/mygives, /mygive)
// =============================================================================

impl Lang {
    pub fn status_icon(&self, status: GiveawayStatus) -> &'static str {
        match status {
            GiveawayStatus::NotPublished => "⏳",
            GiveawayStatus::Published => "✅",
            GiveawayStatus::Finished => "☑️",
        }
    }

    pub fn status_name(&self, status: GiveawayStatus) -> &'static str {
        match (self, status) {
            (Lang::En, GiveawayStatus::NotPublished) => "⏳ Waiting for publication",
            (Lang::En, GiveawayStatus::Published) => "✅ Published",
            (Lang::En, GiveawayStatus::Finished) => "❌ Finished",
            (Lang::Ru, GiveawayStatus::NotPublished) => "⏳ Ждёт публикации",
            (Lang::Ru, GiveawayStatus::Published) => "✅ Опубликован",
            (Lang::Ru, GiveawayStatus::Finished) => "❌ Завершён",
        }
    }

    pub fn my_gives_header(&self) -> &'static str {
        match self {
            Lang::En => "🎁<b>Your giveaways!</b>\n\n",
            Lang::Ru => "🎁<b>Ваши розыгрыши!</b>\n\n",
        }
    }

    pub fn no_giveaways(&self) -> &'static str {
        match self {
            Lang::En => "❌ You have no giveaways!",
            Lang::Ru => "❌ У вас нет розыгрышей!",
        }
    }

    pub fn giveaway_not_accessible(&self, giveaway_id: i32) -> String {
        match self {
            Lang::En => format!(
                "❌ Giveaway #{} was not found or you have no access to it.",
                giveaway_id
            ),
            Lang::Ru => format!(
                "❌ Розыгрыш №{} не найден или у вас нет к нему доступа.",
                giveaway_id
            ),
        }
    }

    pub fn giveaway_not_finished_yet(&self) -> &'static str {
        match self {
            Lang::En => "The giveaway has not finished yet.",
            Lang::Ru => "Розыгрыш ещё не завершён.",
        }
    }

    pub fn btn_change_end_condition(&self) -> &'static str {
        match self {
            Lang::En => "Change the end condition",
            Lang::Ru => "Изменить условия завершения розыгрыша",
        }
    }

    pub fn btn_finish_now(&self) -> &'static str {
        match self {
            Lang::En => "Draw the results right now",
            Lang::Ru => "Подвести итоги прямо сейчас",
        }
    }

    pub fn btn_result_link(&self) -> &'static str {
        match self {
            Lang::En => "Get the results link",
            Lang::Ru => "Получить ссылку на результаты",
        }
    }

    pub fn btn_add_winners(&self) -> &'static str {
        match self {
            Lang::En => "Pick additional winners",
            Lang::Ru => "Выбрать дополнительных победителей",
        }
    }

    pub fn btn_delete_giveaway(&self) -> &'static str {
        match self {
            Lang::En => "Delete the giveaway",
            Lang::Ru => "Удалить розыгрыш",
        }
    }

    pub fn btn_yes(&self) -> &'static str {
        match self {
            Lang::En => "Yes",
            Lang::Ru => "Да",
        }
    }

    pub fn btn_no(&self) -> &'static str {
        match self {
            Lang::En => "No",
            Lang::Ru => "Нет",
        }
    }

    pub fn btn_cancel(&self) -> &'static str {
        match self {
            Lang::En => "Cancel",
            Lang::Ru => "Отмена",
        }
    }

    pub fn delete_confirm(&self) -> &'static str {
        match self {
            Lang::En => "Are you sure you want to delete the giveaway?",
            Lang::Ru => "Вы уверены, что хотите удалить розыгрыш?",
        }
    }

    pub fn deleted_ok(&self) -> &'static str {
        match self {
            Lang::En => "✅ The giveaway was deleted.",
            Lang::Ru => "✅ Розыгрыш успешно удален.",
        }
    }

    pub fn finish_confirm(&self) -> &'static str {
        match self {
            Lang::En => "Are you sure you want to finish the giveaway?",
            Lang::Ru => "Вы уверены, что хотите завершить розыгрыш?",
        }
    }

    pub fn finishing_now(&self) -> &'static str {
        match self {
            Lang::En => "Finishing the giveaway...",
            Lang::Ru => "Заканчиваем розыгрыш...",
        }
    }

    pub fn end_condition_how(&self) -> &'static str {
        match self {
            Lang::En => "🗓 How should the giveaway end?",
            Lang::Ru => "🗓 Как завершить розыгрыш?",
        }
    }

    pub fn btn_end_by_count(&self) -> &'static str {
        match self {
            Lang::En => "By participant count",
            Lang::Ru => "По кол-ву участников",
        }
    }

    pub fn btn_end_by_time(&self) -> &'static str {
        match self {
            Lang::En => "By time",
            Lang::Ru => "По времени",
        }
    }

    pub fn ask_end_count(&self) -> &'static str {
        match self {
            Lang::En => "🏁 Enter the participant count that triggers the draw:",
            Lang::Ru => "🏁 Укажите количество участников для проведения розыгрыша:",
        }
    }

    pub fn ask_end_time(&self) -> &'static str {
        match self {
            Lang::En => {
                "🏁 When should the winners be drawn? (Use the dd.mm.yyyy hh:mm format)\n\n\
                 The bot lives in (GMT+3) Moscow time"
            }
            Lang::Ru => {
                "🏁 Когда нужно определить победителя? (Укажите время в формате дд.мм.гггг чч:мм)\n\n\
                 Бот живет по времени (GMT+3) Москва, Россия"
            }
        }
    }

    pub fn end_count_too_low(&self, current: usize) -> String {
        match self {
            Lang::En => format!("❌ The participant count cannot be below {}!", current),
            Lang::Ru => format!("❌ Количество участников не может быть меньше {}!", current),
        }
    }

    pub fn end_count_saved(&self) -> &'static str {
        match self {
            Lang::En => "🎉 The participant threshold was updated!",
            Lang::Ru => "🎉 Количество участников для проведения розыгрыша изменено!",
        }
    }

    pub fn end_time_saved(&self) -> &'static str {
        match self {
            Lang::En => "✅The results time was saved",
            Lang::Ru => "✅Время для подведения результатов сохранено",
        }
    }

    pub fn invalid_datetime(&self) -> &'static str {
        match self {
            Lang::En => "❌Invalid <b><u>date and time</u></b> format!",
            Lang::Ru => "❌Некорректный формат <b><u>дата и времени</u></b>!",
        }
    }

    pub fn datetime_too_soon(&self) -> &'static str {
        match self {
            Lang::En => "❌The date and time must be at least 5 minutes from now!",
            Lang::Ru => "❌Дата и время должны быть не раньше чем через 5 минут от текущего времени!",
        }
    }

    pub fn invalid_number(&self) -> &'static str {
        match self {
            Lang::En => "❌ That is not a valid <b><u>number</u></b>!",
            Lang::Ru => "❌ Некорректное <b><u>число</u></b>!",
        }
    }

    pub fn result_link_text(&self, verify_link: &str) -> String {
        match self {
            Lang::En => format!(
                "You can publish this link in the channel as proof of a fair draw:\n\n\
                 <code>{}</code>",
                verify_link
            ),
            Lang::Ru => format!(
                "Эту ссылку вы можете опубликовать в канале в подтверждение честности \
                 проведенного розыгрыша:\n\n<code>{}</code>",
                verify_link
            ),
        }
    }

    pub fn add_winners_ask(&self) -> &'static str {
        match self {
            Lang::En => {
                "❗️<b>Note:</b>\nThe participant list is kept for <b>7 DAYS</b> after the \
                 giveaway finishes!\n\n🏁 Enter the number of additional winners:"
            }
            Lang::Ru => {
                "❗️<b>Примечание:</b>\nСписок участников розыгрыша хранится <b>7 ДНЕЙ</b> \
                 после его завершения!\n\n🏁 Укажите количество дополнительных победителей:"
            }
        }
    }

    pub fn no_participants_available(&self) -> &'static str {
        match self {
            Lang::En => "No participants left to draw from.",
            Lang::Ru => "Нет участников для выбора.",
        }
    }

    pub fn extra_winners_done(&self, winner_mentions: &str) -> String {
        match self {
            Lang::En => format!(
                "Additional winners were selected!\n{}",
                winner_mentions
            ),
            Lang::Ru => format!(
                "Выбор дополнительных победителей завершен!\n{}",
                winner_mentions
            ),
        }
    }

    pub fn no_extra_winners(&self) -> &'static str {
        match self {
            Lang::En => {
                "Nobody satisfying the conditions was found, no additional winners!"
            }
            Lang::Ru => {
                "Не нашлось участников, выполнивших условия розыгрыша, дополнительных \
                 победителей нет!"
            }
        }
    }
}

// =============================================================================
// Check (verification deep link)
// =============================================================================

impl Lang {
    pub fn check_header(&self, giveaway_id: i32, post_url: &str) -> String {
        match self {
            Lang::En => format!(
                "Giveaway #{}\n<a href='{}'>Link to the giveaway</a>\n",
                giveaway_id, post_url
            ),
            Lang::Ru => format!(
                "Розыгрыш #{}\n<a href='{}'>Ссылка на розыгрыш</a>\n",
                giveaway_id, post_url
            ),
        }
    }

    pub fn check_counts(&self, participants: i32, winners: i32) -> String {
        match self {
            Lang::En => format!(
                "Participants: {}\nWinners: {}\n",
                participants, winners
            ),
            Lang::Ru => format!(
                "Кол-во участников: {}\nКол-во победителей: {}\n",
                participants, winners
            ),
        }
    }

    pub fn check_ended_by_count(&self, end_count: i32) -> String {
        match self {
            Lang::En => format!("The giveaway ended at {} participants\n", end_count),
            Lang::Ru => format!("Розыгрыш завершен по кол-ву участников: {}\n", end_count),
        }
    }

    pub fn check_ended_by_time(&self, end_at: DateTime<Utc>) -> String {
        match self {
            Lang::En => format!(
                "The giveaway ended by time: {}\n",
                format_user_datetime(end_at)
            ),
            Lang::Ru => format!(
                "Розыгрыш завершён по времени: {}\n",
                format_user_datetime(end_at)
            ),
        }
    }

    pub fn check_winners_header(&self) -> &'static str {
        match self {
            Lang::En => "\nGiveaway results:\n\nWinners:\n",
            Lang::Ru => "\nРезультаты розыгрыша:\n\nПобедитель:\n",
        }
    }
}

// =============================================================================
// Creation flow
// =============================================================================

impl Lang {
    pub fn no_channels_for_giveaway(&self) -> &'static str {
        match self {
            Lang::En => {
                "❌ You have no channels/groups to run a giveaway in.\n\n\
                 Add the bot to your channel as an administrator first."
            }
            Lang::Ru => {
                "❌ У вас нет каналов/групп для создания розыгрыша.\n\n\
                 Сначала добавьте бота в Ваш канал в роли администратора."
            }
        }
    }

    pub fn creation_intro(&self) -> &'static str {
        match self {
            Lang::En => {
                "<b>CREATING A GIVEAWAY!</b>\n\n\
                 Send the giveaway text.\n\
                 You can attach a picture, a video or a GIF to the text!\n\n\
                 <b>❗️ Important:</b>\n<i>Only 1 media file can be used.</i>"
            }
            Lang::Ru => {
                "<b>СОЗДАНИЕ РОЗЫГРЫША!</b>\n\n\
                 Отправьте текст для розыгрыша.\n\
                 Вы можете также отправить вместе с текстом картинку, видео или GIF!\n\n\
                 <b>❗️ Важно:</b>\n<i>Вы можете использовать только 1 медиафайл.</i>"
            }
        }
    }

    pub fn single_media_warning(&self) -> &'static str {
        match self {
            Lang::En => "❗️ Important:\nOnly 1 media file can be used.",
            Lang::Ru => "❗️ Важно:\nВы можете использовать только 1 медиафайл.",
        }
    }

    pub fn media_added(&self) -> &'static str {
        match self {
            Lang::En => "✅ Media attached!",
            Lang::Ru => "✅ Медиафайл успешно добавлен!",
        }
    }

    pub fn text_added(&self) -> &'static str {
        match self {
            Lang::En => "✅ Text saved!",
            Lang::Ru => "✅ Текст успешно добавлен!",
        }
    }

    pub fn ask_button(&self) -> &'static str {
        match self {
            Lang::En => {
                "Send the text you want on the join button.\nOr pick one of the options below:"
            }
            Lang::Ru => {
                "Отправьте текст, который вы хотите видеть на кнопке.\n\
                 Либо выберите один из вариантов ниже:"
            }
        }
    }

    pub fn button_preset(&self, index: usize) -> &'static str {
        match (self, index) {
            (Lang::En, 1) => "Join",
            (Lang::En, 2) => "I'm in!",
            (Lang::En, _) => "Take part",
            (Lang::Ru, 1) => "Участвовать",
            (Lang::Ru, 2) => "Участвую!",
            (Lang::Ru, _) => "Принять участие",
        }
    }

    pub fn button_saved(&self) -> &'static str {
        match self {
            Lang::En => "✅ Button text saved!",
            Lang::Ru => "✅ Текст кнопки успешно сохранен!",
        }
    }

    pub fn ask_sponsors(&self) -> &'static str {
        match self {
            Lang::En => {
                "📊 Add the channels users must subscribe to before joining.\n\
                 <b>❗️ A subscription to the channel hosting the giveaway is required \
                 and enabled by default.</b>\n\n\
                 To add a channel:\n\
                 1. <b>Add the bot</b> to your channel <u>as an administrator</u>\n\
                 (so the bot can verify the subscription).\n\
                 2. <b>Send the channel id to the bot</b> ❗️\n\n\
                 ⚠️<b>If joining should not require any subscriptions, press the button below:</b>"
            }
            Lang::Ru => {
                "📊 Добавьте каналы, на которые пользователям нужно будет подписаться \
                 для участия в розыгрыше.\n\
                 <b>❗️ Подписка на канал, в котором проводится розыгрыш, обязательна и \
                 включена по умолчанию.</b>\n\n\
                 Чтобы добавить канал, нужно:\n\
                 1. <b>Добавить бота</b> в Ваш канал <u>в роли администратора</u>\n\
                 (это нужно, чтобы бот мог проверить подписан ли пользователь на канал).\n\
                 2. <b>Отправить боту канал</b> ❗️\n\n\
                 ⚠️<b>Если Вы хотите, чтобы участие в розыгрыше было без подписок на канал, \
                 нажмите кнопку ниже:</b>"
            }
        }
    }

    pub fn btn_no_sponsors(&self) -> &'static str {
        match self {
            Lang::En => "Giveaway without mandatory subscriptions",
            Lang::Ru => "Розыгрыш без обязательных подписок",
        }
    }

    pub fn btn_enough_sponsors(&self) -> &'static str {
        match self {
            Lang::En => "Enough channels, moving on!",
            Lang::Ru => "Достаточно каналов, двигаемся дальше!",
        }
    }

    pub fn sponsor_added(&self, channel_list: &str) -> String {
        match self {
            Lang::En => format!(
                "✅ Channel added, you can add another one or continue!\n\n\
                 Added channels:\n{}\n\
                 <b>❗️ Important:</b>\nDo not demote the bot in these channels, otherwise \
                 subscription checks will stop working!",
                channel_list
            ),
            Lang::Ru => format!(
                "✅ Канал добавлен, Вы можете добавить еще один или продолжить создание \
                 розыгрыша!\n\n\
                 Добавленные каналы:\n{}\n\
                 <b>❗️ Важно:</b>\nНе забирайте у бота права администратора канала, иначе \
                 проверка подписки происходить не будет!",
                channel_list
            ),
        }
    }

    pub fn sponsor_needs_admin(&self) -> &'static str {
        match self {
            Lang::En => "❌ The bot must be an administrator of that channel to add it.",
            Lang::Ru => "❌ Для добавления канала бот должен быть админом в этом канале.",
        }
    }

    pub fn channel_not_found(&self) -> &'static str {
        match self {
            Lang::En => "❌ Channel not found!",
            Lang::Ru => "❌ Канал не найден!",
        }
    }

    pub fn ask_winners_count(&self) -> &'static str {
        match self {
            Lang::En => "🎲How many winners should the bot pick?",
            Lang::Ru => "🎲Сколько победителей выбрать боту?",
        }
    }

    pub fn winners_count_saved(&self, count: i32) -> String {
        match self {
            Lang::En => format!("✅ Winners count saved: {}", count),
            Lang::Ru => format!("✅ Количество победителей успешно сохранено: {}", count),
        }
    }

    pub fn invalid_winners_count(&self) -> &'static str {
        match self {
            Lang::En => "❌ Invalid <b><u>number</u></b> of winners!",
            Lang::Ru => "❌ Некорректное <b><u>число</u></b> победителей!",
        }
    }

    pub fn ask_channel(&self) -> &'static str {
        match self {
            Lang::En => "Which channel do we publish the giveaway in?",
            Lang::Ru => "В каком канале публикуем розыгрыш?",
        }
    }

    pub fn channel_chosen(&self) -> &'static str {
        match self {
            Lang::En => "✅ Channel selected!",
            Lang::Ru => "✅ Канал выбран!",
        }
    }

    pub fn conditions_preview(&self, conditions: &str) -> String {
        match self {
            Lang::En => format!("This is how the conditions block looks now:\n{}", conditions),
            Lang::Ru => format!("Сейчас блок условий выглядит так:\n{}", conditions),
        }
    }

    pub fn ask_extra_conditions(&self) -> &'static str {
        match self {
            Lang::En => {
                "<b>❗️IMPORTANT</b>:\n\
                 <i>When picking the winners the bot only verifies the channel \
                 subscriptions!</i>\n\n\
                 Extra conditions are <b><i><u>not checked</u></i></b> by the bot!\n\n\
                 📝Want to add extra conditions on top of the subscriptions?\n\n\
                 <b>✅ Send them to the bot as text!</b>"
            }
            Lang::Ru => {
                "<b>❗️ВАЖНО</b>:\n\
                 <i>При выборе победителей розыгрыша бот проверяет лишь подписки на \
                 указанные каналы!</i>\n\n\
                 Дополнительные условия ботом <b><i><u>не проверяются</u></i></b>!\n\n\
                 📝Хочешь добавить дополнительные условия помимо подписок на канал(ы)?\n\n\
                 <b>✅ Для добавления дополнительных условий отправь текст боту!</b>"
            }
        }
    }

    pub fn btn_no_extra_conditions(&self) -> &'static str {
        match self {
            Lang::En => "No extra conditions!",
            Lang::Ru => "Без дополнительных условий!",
        }
    }

    pub fn extra_conditions_saved(&self) -> &'static str {
        match self {
            Lang::En => "✅ Extra conditions saved!",
            Lang::Ru => "✅ Дополнительные условия сохранены!",
        }
    }

    pub fn ask_post_time(&self) -> &'static str {
        match self {
            Lang::En => "⏰ When should the giveaway be published?",
            Lang::Ru => "⏰ Когда нужно опубликовать розыгрыш?",
        }
    }

    pub fn btn_post_now(&self) -> &'static str {
        match self {
            Lang::En => "Right now!",
            Lang::Ru => "Прямо сейчас!",
        }
    }

    pub fn btn_post_plan(&self) -> &'static str {
        match self {
            Lang::En => "Schedule the publication!",
            Lang::Ru => "Запланировать публикацию!",
        }
    }

    pub fn post_now_ok(&self) -> &'static str {
        match self {
            Lang::En => "✅ The giveaway will be published right after it is saved!",
            Lang::Ru => "✅ Розыгрыш будет опубликован сразу после его создания!",
        }
    }

    pub fn ask_post_datetime(&self) -> &'static str {
        match self {
            Lang::En => {
                "⏰ When should the giveaway be published? (Use the dd.mm.yyyy hh:mm format)\n\n\
                 The bot lives in (GMT+3) Moscow time"
            }
            Lang::Ru => {
                "⏰ Когда нужно опубликовать розыгрыш? (Укажите время в формате дд.мм.гггг чч:мм)\n\n\
                 Бот живет по времени (GMT+3) Москва, Россия"
            }
        }
    }

    pub fn post_time_saved(&self) -> &'static str {
        match self {
            Lang::En => "✅ The publication time was saved!",
            Lang::Ru => "✅ Время для публикации розыгрыша сохранено!",
        }
    }

    pub fn ask_end_kind(&self) -> &'static str {
        match self {
            Lang::En => "⌛️ How should the giveaway end?",
            Lang::Ru => "⌛️ Как закончить розыгрыш?",
        }
    }

    pub fn ask_end_count_creation(&self) -> &'static str {
        match self {
            Lang::En => {
                "🏁 Enter the participant count that triggers the draw:\n\n\
                 ❗️ Note: a participant is someone who pressed the join button, \
                 not a channel subscriber."
            }
            Lang::Ru => {
                "🏁 Укажите количество участников для проведения розыгрыша:\n\n\
                 ❗️ Обратите внимание, участник - тот, кто поучаствовал в розыгрыше, \
                 выбор будет не по количеству подписчиков канала, а именно по количеству \
                 участников (кто нажал на кнопку в розыгрыше)"
            }
        }
    }

    pub fn end_too_close_to_post(&self) -> &'static str {
        match self {
            Lang::En => "❌ The end time must leave at least a minute after the publication!",
            Lang::Ru => "❌ Время окончания должно быть не ранее чем через минуту после времени публикации!",
        }
    }

    pub fn end_count_below_winners(&self) -> &'static str {
        match self {
            Lang::En => "❌ The participant threshold cannot be below the winners count!",
            Lang::Ru => "❌ Количество участников не может быть меньше числа победителей!",
        }
    }

    pub fn preview_header(&self) -> &'static str {
        match self {
            Lang::En => "❗️<b>Giveaway preview:</b>",
            Lang::Ru => "❗️<b>Превью розыгрыша:</b>",
        }
    }

    pub fn giveaway_summary(
        &self,
        channel_link: &str,
        winners_count: i32,
        post_line: &str,
        end_line: &str,
    ) -> String {
        match self {
            Lang::En => format!(
                "❗️ <b>Double-check the giveaway.</b>\n\n\
                 The giveaway post goes to {}\n\n\
                 🏆<b> Winners: {}</b>\n\n\
                 🕒 Publication: {}\n\n{}",
                channel_link, winners_count, post_line, end_line
            ),
            Lang::Ru => format!(
                "❗️ <b>Внимательно перепроверьте розыгрыш.</b>\n\n\
                 Пост розыгрыша в {}\n\n\
                 🏆<b> Количество победителей: {}</b>\n\n\
                 🕒 Время публикации: {}\n\n{}",
                channel_link, winners_count, post_line, end_line
            ),
        }
    }

    pub fn summary_post_now(&self) -> &'static str {
        match self {
            Lang::En => "<b>right after saving</b>",
            Lang::Ru => "<b>сразу после сохранения</b>",
        }
    }

    pub fn summary_end_at(&self, end_at: DateTime<Utc>) -> String {
        match self {
            Lang::En => format!(
                "🕒🔚 Results at: <b>{}</b>",
                format_user_datetime(end_at)
            ),
            Lang::Ru => format!(
                "🕒🔚 Результаты розыгрыша в: <b>{}</b>",
                format_user_datetime(end_at)
            ),
        }
    }

    pub fn summary_end_count(&self, end_count: i32) -> String {
        match self {
            Lang::En => format!(
                "👥🔚 Results once <b>{} participant(s)</b> joined",
                end_count
            ),
            Lang::Ru => format!(
                "👥🔚 Результаты розыгрыша когда будет достигнуто <b>{} участника(ов)</b>",
                end_count
            ),
        }
    }

    pub fn btn_captcha_on(&self) -> &'static str {
        match self {
            Lang::En => "Captcha: enable",
            Lang::Ru => "Капча: включить",
        }
    }

    pub fn btn_captcha_off(&self) -> &'static str {
        match self {
            Lang::En => "Captcha: disable",
            Lang::Ru => "Капча: выключить",
        }
    }

    pub fn btn_save_giveaway(&self) -> &'static str {
        match self {
            Lang::En => "✅ Save the giveaway",
            Lang::Ru => "✅ Сохранить розыгрыш",
        }
    }

    pub fn captcha_on_text(&self) -> &'static str {
        match self {
            Lang::En => {
                "❗️<b>ATTENTION.</b>\n✅ <i>You enabled the captcha!</i>\n\n\
                 <b>Every user will have to solve a picture captcha before joining</b>❗️\n\n\
                 ⚠️<b>This makes stuffing the giveaway with bots impossible.</b>"
            }
            Lang::Ru => {
                "❗️<b>ВНИМАНИЕ.</b>\n✅ <i>Вы включили капчу!</i>\n\n\
                 <b>Теперь каждый пользователь перед участием должен будет решить \
                 графическую капчу</b>❗️\n\n\
                 ⚠️<b>Эта функция создана для того, чтобы в конкурсе невозможно было \
                 накрутить ботов.</b>"
            }
        }
    }

    pub fn captcha_off_text(&self) -> &'static str {
        match self {
            Lang::En => {
                "ℹ️ <i>You disabled the captcha</i>❌\n\
                 Participants will not have to solve a picture captcha."
            }
            Lang::Ru => {
                "ℹ️ <i>Вы отключили капчу</i>❌\n\
                 Теперь для участия в розыгрыше участникам не нужно решать графическую капчу."
            }
        }
    }

    pub fn giveaway_saved(&self) -> &'static str {
        match self {
            Lang::En => {
                "✅ The giveaway is saved and queued for publication!\n\n\
                 Send /mygives to see your giveaways."
            }
            Lang::Ru => {
                "✅ Розыгрыш сохранен и готовится к публикации!\n\n\
                 Для просмотра розыгрышей отправьте /mygives"
            }
        }
    }

    pub fn datetime_example(&self, now: DateTime<Utc>) -> String {
        let header = match self {
            Lang::En => "<b>EXAMPLES:</b>\n",
            Lang::Ru => "<b>ПРИМЕРЫ:</b>\n",
        };
        let labels = match self {
            Lang::En => ["in 10 minutes", "in an hour", "in a day", "in a week"],
            Lang::Ru => ["через 10 минут", "через час", "через день", "через неделю"],
        };
        let offsets = [
            Duration::minutes(10),
            Duration::hours(1),
            Duration::days(1),
            Duration::days(7),
        ];
        let mut text = header.to_string();
        for (offset, label) in offsets.iter().zip(labels) {
            text.push_str(&format!(
                "<code>{}</code> - {}\n",
                format_user_datetime(now + *offset),
                label
            ));
        }
        text.trim_end().to_string()
    }
}

// =============================================================================
// General commands
// =============================================================================

impl Lang {
    pub fn start_welcome(&self) -> &'static str {
        match self {
            Lang::En => {
                "🎁 <b>Giveaway bot</b>\n\n\
                 I run giveaways in Telegram channels: users join via a button, \
                 and I draw the winners among those who kept the subscriptions.\n\n\
                 • /newgive — create a giveaway\n\
                 • /mygives — your giveaways\n\
                 • /cancel — abort the current action"
            }
            Lang::Ru => {
                "🎁 <b>Бот для розыгрышей</b>\n\n\
                 Я провожу розыгрыши в Telegram-каналах: участники жмут кнопку, \
                 а я выбираю победителей среди тех, кто сохранил подписки.\n\n\
                 • /newgive — создать розыгрыш\n\
                 • /mygives — мои розыгрыши\n\
                 • /cancel — отменить действие"
            }
        }
    }

    pub fn cancelled(&self) -> &'static str {
        match self {
            Lang::En => "Action cancelled.",
            Lang::Ru => "Действие отменено.",
        }
    }

    pub fn nothing_to_cancel(&self) -> &'static str {
        match self {
            Lang::En => "Nothing to cancel.",
            Lang::Ru => "Нечего отменять.",
        }
    }

    pub fn error_try_later(&self) -> &'static str {
        match self {
            Lang::En => "❌ Something went wrong. Please try again later.",
            Lang::Ru => "❌ Что-то пошло не так. Попробуйте позже.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_resolution_defaults_to_russian() {
        assert_eq!(Lang::from_code(Some("ru")), Lang::Ru);
        assert_eq!(Lang::from_code(Some("en")), Lang::En);
        assert_eq!(Lang::from_code(Some("uk")), Lang::En);
        assert_eq!(Lang::from_code(None), Lang::Ru);
    }

    #[test]
    fn datetime_examples_list_four_offsets() {
        let text = Lang::En.datetime_example(Utc::now());
        assert_eq!(text.matches("<code>").count(), 4);
    }
}
