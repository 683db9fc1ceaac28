use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("nxtlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: nxtlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("NXTLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("NXTLINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "backends: radio={}, usb={}",
        cfg!(all(feature = "radio", target_os = "linux")),
        cfg!(feature = "usb")
    );

    Ok(SUCCESS)
}
