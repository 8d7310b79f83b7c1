pub mod api_checker;
pub mod fetcher;
pub mod i_api_checker;
pub mod i_notifier;
pub mod slack_notifier;
