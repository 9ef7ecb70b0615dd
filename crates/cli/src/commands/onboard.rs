//! `planexec onboard`: write a default config file.

use planexec_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("planexec setup");
    println!("==============\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    } else {
        println!("Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("Config file exists, left untouched: {}", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("Wrote default config: {}", config_path.display());
    }

    println!("\nNext steps:");
    println!("  1. Set PLANEXEC_API_KEY (or OPENAI_API_KEY), or put api_key in the config file");
    println!("  2. Set TAVILY_API_KEY for live web search, or use [search] backend = \"offline\"");
    println!("  3. Run: planexec run -o \"Write a short bio of Ada Lovelace\"");

    Ok(())
}
