use anyhow::Result;

fn main() -> Result<()> {
    sysyc_driver::main()
}
