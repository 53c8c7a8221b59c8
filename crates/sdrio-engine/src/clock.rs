//! Receive-path clock driver.
//!
//! On the supported hardware the timestamp counter advances only while a
//! receive channel is streaming, even when the caller's actual interest is
//! transmit-only. [`ClockDriver`] accommodates that constraint: it opens
//! and activates a receive stream purely so the clock runs, without ever
//! consuming received samples. The engine can hold this precondition open
//! but cannot create it any other way -- it is a property of the device,
//! not of this layer.

use tracing::debug;

use sdrio_core::device::Device;
use sdrio_core::error::Result;
use sdrio_core::flags::StreamFlags;
use sdrio_core::stream::RxStream;
use sdrio_core::types::SampleFormat;

/// An active receive stream held only to keep the hardware clock advancing.
///
/// Construct with [`start`](ClockDriver::start) before any operation that
/// needs meaningful timestamps (clock reads, timed transmit bursts), and
/// tear down with [`stop`](ClockDriver::stop) when done. While a
/// `ClockDriver` is live, [`Device::hardware_time`] is monotonic
/// non-decreasing.
pub struct ClockDriver {
    stream: Box<dyn RxStream>,
}

impl ClockDriver {
    /// Open and activate a receive stream on channel 0 of `device`.
    pub async fn start(device: &dyn Device) -> Result<Self> {
        let mut stream = device.open_rx_stream(SampleFormat::Cf32, &[0]).await?;
        stream.activate(StreamFlags::NONE, None, 0).await?;
        debug!("clock-driver receive stream active");
        Ok(ClockDriver { stream })
    }

    /// Deactivate the receive stream. The hardware clock freezes at its
    /// current value once no other receive stream is active.
    pub async fn stop(mut self) -> Result<()> {
        self.stream.deactivate().await?;
        debug!("clock-driver receive stream stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use sdrio_sim::SimDevice;

    #[tokio::test(start_paused = true)]
    async fn clock_advances_only_while_driver_runs() {
        let device = SimDevice::builder().build();
        device.set_hardware_time(0).await.unwrap();

        // No receive stream active: the clock is frozen.
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(device.hardware_time().await.unwrap(), 0);

        // Driver running: the clock advances with time.
        let driver = ClockDriver::start(&device).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        let t1 = device.hardware_time().await.unwrap();
        assert_eq!(t1, 10_000_000);

        driver.stop().await.unwrap();

        // Stopped again: frozen at the value it reached.
        tokio::time::advance(Duration::from_millis(25)).await;
        assert_eq!(device.hardware_time().await.unwrap(), t1);
    }
}
