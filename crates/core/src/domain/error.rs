// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Task with name \"{name}\" not found")]
    TaskNotFound { name: String },

    #[error("Task with name \"{name}\" has already been registered")]
    DuplicateTask { name: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
