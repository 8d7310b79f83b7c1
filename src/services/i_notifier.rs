/// Whether a notification actually went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// channel or credential not configured
    Skipped,
}

pub trait INotificationService: Send + Sync + 'static {
    /// Uploads `payload` as a file when given, otherwise posts `message` as
    /// plain text.
    fn notify(
        &self,
        message: &str,
        payload: Option<Vec<u8>>,
    ) -> impl Future<Output = anyhow::Result<Delivery>> + Send;
}
