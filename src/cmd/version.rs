//! Build metadata (`gic version`).

use gic::ui::icons::{PACKAGE, SPARKLE};
use gic::ui::print_box;

pub fn cmd_version() {
    println!();
    println!("{}gic", PACKAGE);
    print_box(
        "Build Details",
        &format!(
            "Version:    {}\nTarget:     {}-{}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::ARCH,
            std::env::consts::OS
        ),
    );
    println!("Run `gic` without arguments to write a commit {}", SPARKLE);
}
