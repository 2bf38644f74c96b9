//! Domain entities and their row layouts.

mod base;
mod daylog;
mod report;
mod tag;
mod user;

pub use base::BaseModel;
pub use daylog::{Daylog, DaylogInput, DaylogPatch, MoodLabel};
pub use report::{MonthlyReport, MoodDistribution, MoodReport, TagCount, TagDistribution, TagReport};
pub use tag::{Tag, TagInput};
pub use user::{validate_email, NewUser, User};
