use chrono::Utc;
use teloxide::{prelude::*, types::InputFile};

use crate::{ConfigParameters, dialogue::Outgoing, ui};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    // Stickers, photos and the like are ignored.
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };

    let today = Utc::now().with_timezone(&cfg.timezone).date_naive();
    let outgoing = cfg.conversation.handle(from.id.0, text, today).await;

    for out in outgoing {
        send(&bot, msg.chat.id, out).await?;
    }

    Ok(())
}

async fn send(bot: &Bot, chat_id: ChatId, out: Outgoing) -> ResponseResult<()> {
    match out {
        Outgoing::Text { text, keyboard } => {
            let mut req = bot.send_message(chat_id, text);
            if let Some(keyboard) = keyboard {
                req = req.reply_markup(ui::markup(keyboard));
            }
            req.await?;
        }
        Outgoing::Document {
            bytes,
            file_name,
            caption,
        } => {
            let mut req = bot.send_document(chat_id, InputFile::memory(bytes).file_name(file_name));
            if let Some(caption) = caption {
                req = req.caption(caption);
            }
            req.await?;
        }
    }
    Ok(())
}
