/// Display version information
pub fn execute() {
    println!("timelock {}", env!("CARGO_PKG_VERSION"));
    println!("Operator CLI for the timelock transaction vault");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_execute() {
        // Version command should not panic
        execute();
    }
}
