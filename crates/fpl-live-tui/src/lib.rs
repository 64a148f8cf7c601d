// Terminal dashboard for comparing two players' live FPL points.

pub mod app;
pub mod poller;
pub mod protocol;
pub mod tui;
