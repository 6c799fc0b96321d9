use thiserror::Error;

#[derive(Debug, Error)]
pub enum DgaError {
    #[error("Input error: {0} is an invalid domain")]
    InvalidDomain(String),

    #[error("character {character:?} at position {position} of {domain} is not in the vocabulary")]
    UnknownCharacter {
        domain: String,
        character: char,
        position: usize,
    },

    #[error("{domain} is {len} characters long, the model accepts at most {max}")]
    DomainTooLong {
        domain: String,
        len: usize,
        max: usize,
    },

    #[error("output path {0} must have a .txt extension")]
    InvalidOutputPath(String),

    #[error("model returned {got} scores for a batch of {expected}")]
    ScoreCount { expected: usize, got: usize },

    #[error("model returned non-finite score {score} for row {row}")]
    NonFiniteScore { row: usize, score: f32 },
}
