//! Version command

/// Lines printed by `garnet version`
pub fn lines() -> [String; 2] {
    [
        garnet_runtime::description(),
        garnet_runtime::GARNET_COPYRIGHT.to_string(),
    ]
}

pub fn run() {
    for line in lines() {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_lines() {
        let [version, copyright] = lines();
        assert!(version.starts_with("garnet "));
        assert!(copyright.contains("Copyright"));
    }
}
