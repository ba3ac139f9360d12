pub mod completion;
pub mod skeleton;
pub mod token;

pub use completion::CompletionCommand;
pub use token::TokenCommand;
