pub(crate) mod digits;
pub(crate) mod hour_cycle;
pub(crate) mod schedule;
