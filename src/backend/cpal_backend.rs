//! Real device I/O via `cpal`. Bridges cpal's callback-driven model into the
//! core's synchronous `process()` through a pair of bounded channels set up
//! once per session — no steady-state allocation on the realtime callback
//! path beyond the fixed-capacity channel handoff itself.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::backend::{AudioBackend, DeviceInfo};
use crate::config::AppConfig;
use crate::error::CoreError;
use crate::pipeline::SonarPipeline;

const CHANNEL_DEPTH: usize = 4;
const RECV_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Default)]
pub struct CpalAudioBackend;

impl CpalAudioBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for CpalAudioBackend {
    fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, CoreError> {
        let host = cpal::default_host();
        let input_devices = host
            .input_devices()
            .map_err(|e| CoreError::BackendUnavailable {
                details: e.to_string(),
            })?;

        let mut devices = Vec::new();
        for (idx, device) in input_devices.enumerate() {
            let name = device.name().unwrap_or_else(|_| "unknown".to_string());
            let input_config = device.default_input_config().ok();
            devices.push(DeviceInfo {
                id: idx as i32,
                name,
                max_input_channels: input_config
                    .as_ref()
                    .map(|c| c.channels() as i32)
                    .unwrap_or(0),
                max_output_channels: 0,
                default_sample_rate: input_config
                    .map(|c| c.sample_rate().0 as f64)
                    .unwrap_or(0.0),
            });
        }

        if devices.is_empty() {
            return Err(CoreError::AudioDeviceUnavailable {
                details: "no input devices found".to_string(),
            });
        }
        Ok(devices)
    }

    fn run_session(
        &mut self,
        config: &AppConfig,
        pipeline: &mut SonarPipeline,
        should_stop: &mut dyn FnMut() -> bool,
    ) -> Result<(), CoreError> {
        let a = config.audio;
        if a.sample_rate_hz <= 0.0 || a.frames_per_buffer == 0 {
            return Err(CoreError::InvalidArgument {
                details: "invalid audio configuration".to_string(),
            });
        }

        let host = cpal::default_host();
        let input_device = host
            .default_input_device()
            .ok_or_else(|| CoreError::AudioDeviceUnavailable {
                details: "no default input device".to_string(),
            })?;
        let output_device = host
            .default_output_device()
            .ok_or_else(|| CoreError::AudioDeviceUnavailable {
                details: "no default output device".to_string(),
            })?;

        let stream_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(a.sample_rate_hz as u32),
            buffer_size: cpal::BufferSize::Fixed(a.frames_per_buffer as u32),
        };

        let (input_tx, input_rx): (SyncSender<Vec<f32>>, Receiver<Vec<f32>>) =
            sync_channel(CHANNEL_DEPTH);
        let (output_tx, output_rx): (SyncSender<Vec<f32>>, Receiver<Vec<f32>>) =
            sync_channel(CHANNEL_DEPTH);

        let err_fn = |err: cpal::StreamError| log::error!("cpal stream error: {}", err);

        let input_stream = input_device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let _ = input_tx.try_send(data.to_vec());
                },
                err_fn,
                None,
            )
            .map_err(|e| CoreError::StreamFailure {
                details: e.to_string(),
            })?;

        let output_stream = output_device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match output_rx
                    .recv_timeout(RECV_TIMEOUT)
                {
                    Ok(buf) => {
                        let n = data.len().min(buf.len());
                        data[..n].copy_from_slice(&buf[..n]);
                        for sample in data[n..].iter_mut() {
                            *sample = 0.0;
                        }
                    }
                    Err(_) => {
                        for sample in data.iter_mut() {
                            *sample = 0.0;
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| CoreError::StreamFailure {
                details: e.to_string(),
            })?;

        input_stream
            .play()
            .map_err(|e| CoreError::StreamFailure {
                details: e.to_string(),
            })?;
        output_stream
            .play()
            .map_err(|e| CoreError::StreamFailure {
                details: e.to_string(),
            })?;

        let mut offset = 0usize;
        let mut output_buf = vec![0.0f32; a.frames_per_buffer];
        let mut xruns = 0u64;

        while !should_stop() {
            match input_rx.recv_timeout(RECV_TIMEOUT) {
                Ok(input_buf) => {
                    let len = input_buf.len().min(a.frames_per_buffer);
                    output_buf.resize(len, 0.0);
                    pipeline.process(&input_buf[..len], &mut output_buf[..len], offset);
                    if output_tx.try_send(output_buf.clone()).is_err() {
                        xruns += 1;
                    }
                    offset += len;
                }
                Err(_) => {
                    xruns += 1;
                }
            }
        }

        pipeline.record_xruns(xruns);
        drop(input_stream);
        drop(output_stream);
        Ok(())
    }
}
