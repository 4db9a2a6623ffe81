// Components module - UI building blocks
//
// Shell components render on every frame:
// - Title bar: app name, session id, lifecycle errors
// - Status bar: session totals and key hints
// - Toast: transient confirmations
//
// Panels own their state and implement the trait system:
// - Chat panel (left)
// - Metrics / History panels (tabbed right pane)
// - Logs panel (toggleable, bottom)

pub mod chat_panel;
pub mod formatters;
pub mod history_panel;
pub mod logs_panel;
pub mod metrics_panel;
pub mod scrollbar;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use chat_panel::ChatPanel;
pub use history_panel::HistoryPanel;
pub use logs_panel::LogsPanel;
pub use metrics_panel::MetricsPanel;
pub use toast::Toast;
