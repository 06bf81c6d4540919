use tower_sessions::Session;

use crate::error::LogoError;
use crate::orchestrator::DESCRIPTION_REQUIRED;

const FLASH_FLAG_KEY: &str = "flash_flag";

pub(crate) const FLASH_DESCRIPTION_REQUIRED: u16 = 1;
pub(crate) const FLASH_GENERATION_FAILED: u16 = 2;
pub(crate) const FLASH_GENERATION_BUSY: u16 = 3;

#[derive(Clone, Debug)]
pub(crate) struct FlashMessage {
    pub(crate) text: &'static str,
    pub(crate) class: &'static str,
}

pub(crate) async fn set_flash(session: &Session, flag: u16) -> Result<(), LogoError> {
    session.insert(FLASH_FLAG_KEY, flag).await?;
    Ok(())
}

/// Turns a user-facing error into its flash flag; anything else is handed back.
pub(crate) fn flag_for(err: LogoError) -> Result<u16, LogoError> {
    match err {
        LogoError::Validation(_) => Ok(FLASH_DESCRIPTION_REQUIRED),
        LogoError::Generation(_) => Ok(FLASH_GENERATION_FAILED),
        LogoError::Busy => Ok(FLASH_GENERATION_BUSY),
        other => Err(other),
    }
}

pub(crate) async fn take_flash_message(
    session: &Session,
) -> Result<Option<FlashMessage>, LogoError> {
    let flag = session
        .get::<u16>(FLASH_FLAG_KEY)
        .await?
        .filter(|flag| *flag != 0);
    if flag.is_some() {
        session.insert(FLASH_FLAG_KEY, 0u16).await?;
    }
    Ok(flag.and_then(message_for))
}

pub(crate) fn message_for(flag: u16) -> Option<FlashMessage> {
    match flag {
        FLASH_DESCRIPTION_REQUIRED => Some(FlashMessage {
            text: DESCRIPTION_REQUIRED,
            class: "warning",
        }),
        FLASH_GENERATION_FAILED => Some(FlashMessage {
            text: "Sorry, we couldn't generate your logos. Please try again later.",
            class: "error",
        }),
        FLASH_GENERATION_BUSY => Some(FlashMessage {
            text: "Your logos are still being generated. Please wait for them to finish.",
            class: "warning",
        }),
        _ => None,
    }
}
