use crate::store::EventStore;

#[derive(Clone)]
pub struct AppState {
    pub store: EventStore,
}

impl AppState {
    pub fn new(store: EventStore) -> Self {
        Self { store }
    }
}
