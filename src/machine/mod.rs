pub mod cascade;
pub mod completion;
pub mod export_csv;
pub mod ranking;
pub mod speed;

pub use cascade::{
    instant_completion_fraction, machine_stats, progress_inputs, schedule_completion,
    starting_units, timed_effects_for, CascadeResult, CascadeStep, MachineStats, StepStats,
    TimedEffect,
};
pub use completion::{
    round_to, CompletionEstimate, CompletionModel, ProgressInputs, WindowProgress,
};
pub use export_csv::write_cascade_csv;
pub use ranking::{rank_toons, RankedToon};
pub use speed::{compare_speed, twisted_matchups, SpeedTier, TwistedMatchup};
