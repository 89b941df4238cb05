// Decode an audio file and stream it to the default output device.
//
// cargo run --example stream --features cpal -- path/to/audio.flac

use ringvoice::{
	StreamingSource,
	ChunkProducer,
	config::StreamConfig,
	device::CpalDevice,
	source::DecodeProducer,
	state::PlayState,
};
use std::time::Duration;

fn main() {
	//-------------------------------------------------------------------- Set-up
	let path = std::env::args().nth(1).expect("usage: stream <PATH>");

	let config = StreamConfig {
		underrun_recovery: true,
		..StreamConfig::DEFAULT
	};

	// Decode lazily, one chunk at a time.
	let producer = DecodeProducer::from_path(&path, config.chunk_bytes).unwrap();
	let spec = producer.spec();
	println!("{path}: {} channel(s), {}Hz", spec.channels, spec.sample_rate);

	// Open a voice matching the audio.
	let device = CpalDevice::open(spec).unwrap();
	let mut source = StreamingSource::with_config(device, producer, config).unwrap();

	//-------------------------------------------------------------------- Service loop
	source.play().unwrap();

	// 16KiB chunks of 16-bit stereo 44.1kHz are ~90ms each,
	// servicing every 10ms keeps 4 of them well ahead.
	while source.play_state() != PlayState::Stopped {
		let tick = source.service().unwrap();

		if let Some(underrun) = tick.underrun {
			eprintln!("{underrun}");
		}

		std::thread::sleep(Duration::from_millis(10));
	}

	println!("done, {} underrun(s)", source.underruns());
}
