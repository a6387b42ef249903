use lazy_static::lazy_static;

pub mod version;

lazy_static! {
    /// The number of CPUs available, used when zero threads are requested.
    pub static ref NUM_CPU: usize = num_cpus::get();
}
