use std::rc::Rc;

use tracing::{info, warn};

use vestora_frontend::config::AppConfig;
use vestora_frontend::logging;
use vestora_frontend::repository::UserRepository;
use vestora_frontend::storage::{BrowserStorage, KeyValueStore, MemoryStorage};
use vestora_frontend::views::{App, AppContext, AppProps};

fn main() {
    // Private browsing and sandboxed frames can refuse localStorage.
    let mut storage_error = None;
    let store: Rc<dyn KeyValueStore> = match BrowserStorage::new() {
        Ok(storage) => Rc::new(storage),
        Err(err) => {
            storage_error = Some(err);
            Rc::new(MemoryStorage::new())
        }
    };

    let loaded = AppConfig::load(store.as_ref());
    let config = loaded.as_ref().cloned().unwrap_or_default();
    logging::init(&config.log_level);

    if let Some(err) = storage_error {
        warn!(error = %err, "falling back to in-memory storage, data will not persist");
    }
    if let Err(err) = loaded {
        warn!(error = %err, "ignoring unreadable appConfig slot");
    }
    info!(minimum_balance = %config.minimum_balance, "starting dashboard");

    let context = AppContext {
        repo: Rc::new(UserRepository::new(store)),
        config: Rc::new(config),
    };
    yew::Renderer::<App>::with_props(AppProps { context }).render();
}
