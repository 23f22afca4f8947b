// Configuration loading

pub mod session;
pub mod settings;

pub use session::{SessionError, SessionStore};
pub use settings::{load_dotenv, DotenvStatus, Settings, SettingsError, DOTENV_FILE};
