use slotmap::new_key_type;

new_key_type! {
    /// Identifies a live factory instance in the orchestrator.
    pub struct FactoryId;
}

/// Resources are keyed by name. The resource economy is defined entirely
/// by data files, so names stay strings end to end rather than being
/// interned into numeric ids at startup.
pub type ResourceName = String;
