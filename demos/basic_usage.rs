use std::io;
use tagged_errors::policy::{self, HeadFallback};
use tagged_errors::{chain, errorf, Result};

fn read_file(path: &str) -> io::Result<String> {
    // Simulate a missing file
    Err(io::Error::new(io::ErrorKind::NotFound, format!("{path}: no such file")))
}

fn load_configuration(path: &str) -> Result<String> {
    read_file(path).map_err(|e| errorf!("config#c404: cannot load %s: %w", path, e))
}

fn start(path: &str) -> Result<()> {
    let _config = load_configuration(path).map_err(|e| errorf!("startup: %w", e))?;
    Ok(())
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    let Err(err) = start("bad_config.toml") else {
        println!("Success!");
        return;
    };

    // 1. The canonical string: what a user or a log line sees
    println!("1. [DISPLAY]");
    println!("   \"{err}\"");

    // 2. Classification of the outermost error
    println!("\n2. [FIELDS]");
    println!("   Tag:      {}", err.tag());
    println!("   Code:     {}", err.code());
    println!("   Message:  {}", err.message());
    println!("   Id:       {:#010x}", err.id());
    println!("   Site:     {}", err.trace());

    // 3. The first tagged error with a numeric code, looked up through the chain
    println!("\n3. [CHAIN]");
    for (depth, link) in chain::flatten(&err).iter().enumerate() {
        println!("   #{depth}: {link}");
    }
    if let Some(status) = chain::flatten(&err).tagged().find_map(|e| e.code_number()) {
        println!("   First numeric code: {status}");
    }

    // 4. Structured report, one line per link
    println!("\n4. [CHAIN LOG]");
    err.with_chain_log(|log| {
        for line in log.to_string().lines() {
            println!("   {line}");
        }
    });

    // 5. Headless messages can borrow the call site as tag and code
    println!("\n5. [CALL SITE FALLBACK]");
    let headless = policy::with_head_fallback(HeadFallback::CallSite, || {
        errorf!("something went wrong")
    });
    println!("   \"{headless}\"");

    #[cfg(feature = "serde")]
    {
        println!("\n6. [JSON]");
        match serde_json::to_string_pretty(&err) {
            Ok(json) => println!("{json}"),
            Err(e) => println!("   serialization failed: {e}"),
        }
    }
}
