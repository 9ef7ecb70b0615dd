//! `planexec plan`: print the initial plan without executing it.

use planexec_core::event::EventBus;
use planexec_core::state::TimeContext;
use std::sync::Arc;

pub async fn run(objective: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let agent = super::build_agent(&config, Arc::new(EventBus::default()))?;

    let steps = agent.plan_only(&objective, &TimeContext::now()).await?;
    if steps.is_empty() {
        println!("(the planner returned no tasks)");
    }
    for (i, step) in steps.iter().enumerate() {
        println!("{}. {step}", i + 1);
    }

    Ok(())
}
