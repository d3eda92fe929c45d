//! Publish port - downstream consumer of converted EC values

/// Port for publishing a converted EC value
///
/// Fire-and-forget: the sink is assumed to always accept the value, so
/// there is no return channel and no retry.
pub trait PublishSink {
    /// Hand one EC value (mS/cm) to the downstream consumer
    fn publish(&mut self, ec_ms: f32);
}
