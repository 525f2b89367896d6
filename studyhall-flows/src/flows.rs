pub mod flashcard;
pub mod grading;
pub mod ideas;
pub mod knowledge_graph;
pub mod modify;
pub mod multiple_choice;
pub mod notes;
pub mod quiz;

pub use flashcard::*;
pub use grading::*;
pub use ideas::*;
pub use knowledge_graph::*;
pub use modify::*;
pub use multiple_choice::*;
pub use notes::*;
pub use quiz::*;
