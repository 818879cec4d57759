use std::path::Path;

use super::load_flow;
use crate::error::Result;

pub(crate) fn run(path: &Path) -> Result<()> {
    let flow = load_flow(path)?;
    if let Some(name) = flow.name() {
        println!("# {name}");
    }
    println!("{}", flow.dump());
    Ok(())
}
