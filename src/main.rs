use midi_tools::general::check::{print_access_failure, print_no_devices, print_output_connected};
use midi_tools::general::Session;
use midi_tools::io::{choose_output_device, MidirPlatform};
use midi_tools::{get_output, list_output_devices, request_access, Config, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(_) => (),
        Err(err) => println!("Error: {}", err),
    }
}

fn run() -> Result<()> {
    let config = Config::load_default()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let platform = MidirPlatform::new(config.midi.client_name.clone());
    let access = request_access(&platform).inspect_err(print_access_failure)?;

    let devices = list_output_devices(&platform, Some(&access))?;
    let Some(idx) = choose_output_device(&devices, &config.midi.output_port)? else {
        print_no_devices();
        return Ok(());
    };
    let device = &devices[idx];
    let output = get_output(&platform, &device.id, Some(&access))
        .inspect_err(print_access_failure)?;

    print_output_connected(&device.name, config.midi.channel);

    // `devices` re-enumerates with a fresh access request each time
    let lister_platform = platform.clone();
    let mut session = Session::new(output, config.midi.channel, config.midi.velocity)?
        .with_device_lister(Box::new(move || list_output_devices(&lister_platform, None)));
    session.run_stdin()?;

    println!("Closing connections and exiting...");
    Ok(())
}
