//! Change-event fan-out to connected sockets.

mod notifier;

pub use notifier::ChangeNotifier;
