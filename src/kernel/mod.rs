pub mod event;
pub mod mapper;
pub mod navigator;
pub mod pulse;
pub mod reactor;
pub mod scheduler;
pub mod stabilizer;
pub mod telemetry;
pub mod time;
