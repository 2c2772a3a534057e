pub mod job;
pub mod response;

pub use job::{Category, ExperienceLevel, Job, JobType, NewJob};
