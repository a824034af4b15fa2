use std::path::PathBuf;

/// Loads `.env` from the working directory into the process environment.
///
/// A missing file is not an error. A file that fails to parse is reported on
/// stderr: dotenv stops at the bad line, so nothing after it is loaded.
pub fn load_dotenv() {
    if let Some(warning) = dotenv_warning(dotenv::dotenv()) {
        eprintln!("{}", warning);
    }
}

fn dotenv_warning(result: Result<PathBuf, dotenv::Error>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(err) if err.not_found() => None,
        Err(dotenv::Error::LineParse(line, _)) => Some(format!(
            "warning: .env could not be parsed at `{}`; it and every later line were skipped \
             (keys with '-' such as x-rapidapi-key are not accepted there, use RAPIDAPI_KEY)",
            line
        )),
        Err(err) => Some(format!("warning: .env could not be loaded: {}", err)),
    }
}
