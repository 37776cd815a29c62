#![forbid(unsafe_code)]

use nestgql_cli::NestgqlError;

fn main() -> Result<(), NestgqlError> {
    nestgql_cli::run()
}
