//! Assistant Command

use fiscal_core::assistant::{AnswerService, HttpAnswerService, Question};
use fiscal_core::repository::DataContext;

use super::{CommandError, CommandResult};

pub async fn ask_assistant(data: &DataContext, question: &str) -> CommandResult<String> {
    let service = HttpAnswerService::new(data.config().assistant);
    service
        .answer(&Question::new(question))
        .await
        .map(|answer| answer.answer)
        .map_err(|e| CommandError::from(fiscal_core::DomainError::from(e)))
}
