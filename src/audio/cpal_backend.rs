use crate::audio::AudioBackend;
use crate::notch::{EngineConfig, NotchProcessor};
use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use log::{error, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Block size assumed when the device does not report a fixed one.
const DEFAULT_BLOCK_SIZE: usize = 1024;
/// Level of the demo noise source, well below full scale.
const NOISE_LEVEL: f32 = 0.2;

/// Plays a noise source through the notch processor on the default output device.
pub struct CpalBackend {
    device: cpal::Device,
    stream_config: cpal::StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
}

impl CpalBackend {
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = Self::select_output_device(&host)?;
        info!("Selected device: {}", device.name().unwrap_or_default());

        let supported_config = device
            .default_output_config()
            .context("Failed to query default output config")?;
        let sample_format = supported_config.sample_format();
        let stream_config: cpal::StreamConfig = supported_config.into();

        Ok(Self {
            device,
            stream_config,
            sample_format,
            stream: None,
        })
    }

    /// The configuration the engine must be prepared with before `start`.
    pub fn engine_config(&self) -> EngineConfig {
        let max_block_size = match self.stream_config.buffer_size {
            cpal::BufferSize::Fixed(frames) => frames as usize,
            cpal::BufferSize::Default => DEFAULT_BLOCK_SIZE,
        };
        EngineConfig::new(
            self.stream_config.sample_rate.0 as f32,
            max_block_size,
            self.stream_config.channels as usize,
        )
    }

    fn select_output_device(host: &cpal::Host) -> Result<cpal::Device> {
        if cfg!(target_os = "linux") {
            Self::select_linux_output_device(host)
        } else {
            host.default_output_device()
                .ok_or_else(|| anyhow!("No output device available"))
        }
    }

    fn select_linux_output_device(host: &cpal::Host) -> Result<cpal::Device> {
        let mut device_names = Vec::new();

        for device in host.devices()? {
            let name = device.name().unwrap_or_default();
            if name.to_lowercase().starts_with("default:")
                || name.to_lowercase().contains("pipewire")
            {
                device_names.push(name);
            }
        }

        if device_names.is_empty() {
            return host
                .default_output_device()
                .ok_or_else(|| anyhow!("No output device available"));
        }

        println!("Available output devices:");
        for (i, name) in device_names.iter().enumerate() {
            println!("{}. {}", i + 1, name);
        }

        println!("Select device (default 1): ");
        let mut choice = String::new();
        std::io::stdin().read_line(&mut choice)?;
        let choice = choice
            .trim()
            .parse::<usize>()
            .unwrap_or(1)
            .saturating_sub(1);

        let selected_name = device_names
            .get(choice)
            .ok_or_else(|| anyhow!("Invalid device selection"))?;

        host.devices()?
            .find(|d| d.name().map(|n| n == *selected_name).unwrap_or(false))
            .ok_or_else(|| anyhow!("Selected output device not found"))
    }

    fn build_stream(&self, mut processor: NotchProcessor) -> Result<Stream> {
        let channels = self.stream_config.channels as usize;
        let mut rng = SmallRng::seed_from_u64(0x5eed);

        let stream = match self.sample_format {
            SampleFormat::F32 => self.device.build_output_stream(
                &self.stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // Same noise on every channel of a frame
                    for frame in data.chunks_mut(channels) {
                        let noise = (rng.random::<f32>() * 2.0 - 1.0) * NOISE_LEVEL;
                        frame.fill(noise);
                    }
                    processor.process_interleaved(data, channels);
                },
                |err| error!("Stream error: {}", err),
                None,
            )?,
            other => bail!("Unsupported sample format {:?}", other),
        };

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self, processor: NotchProcessor) -> Result<()> {
        let stream = self.build_stream(processor)?;
        stream.play().context("Failed to start stream")?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stream) = &self.stream {
            stream.pause().context("Failed to stop stream")?;
        }
        Ok(())
    }
}
