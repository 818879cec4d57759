use crate::error::Result;
use crate::steps::registry;

pub(crate) fn run() -> Result<()> {
    for id in registry().ids() {
        println!("{id}");
    }
    Ok(())
}
