pub mod dispatch;
pub mod graph;
pub mod mode;
pub mod names;
pub mod trace;

#[cfg(test)]
mod test;
