use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();
    colourcomb::runtime::native::start()
}
