pub mod cache;
pub mod calibrate;
pub mod classify;
pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod master;
pub mod night;
pub mod pipeline;
pub mod stack;
