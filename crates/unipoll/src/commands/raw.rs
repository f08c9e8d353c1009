//! Raw API requests: `get`, `post`, `put`.

use crate::cli::{GlobalOpts, RequestArgs};
use crate::error::CliError;

use super::{connect, disconnect, print_body};

pub async fn get(global: &GlobalOpts, args: RequestArgs) -> Result<(), CliError> {
    let data = read_data(args.data.as_deref())?;
    let session = connect(global).await?;
    let result = session.get_json(&args.path, data.as_deref()).await;
    disconnect(&session).await;
    print_body(&result?);
    Ok(())
}

pub async fn post(global: &GlobalOpts, args: RequestArgs) -> Result<(), CliError> {
    let data = read_data(args.data.as_deref())?;
    let session = connect(global).await?;
    let result = session.post_json(&args.path, data.as_deref()).await;
    disconnect(&session).await;
    print_body(&result?);
    Ok(())
}

pub async fn put(global: &GlobalOpts, args: RequestArgs) -> Result<(), CliError> {
    let data = read_data(args.data.as_deref())?;
    if data.is_none() {
        return Err(unipoll_api::Error::NoParams.into());
    }
    let session = connect(global).await?;
    let result = session.put_json(&args.path, data.as_deref()).await;
    disconnect(&session).await;
    print_body(&result?);
    Ok(())
}

/// Inline JSON or `@path`, validated before anything is sent.
fn read_data(data: Option<&str>) -> Result<Option<String>, CliError> {
    let Some(data) = data else {
        return Ok(None);
    };
    let body = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => data.to_owned(),
    };
    serde_json::from_str::<serde_json::Value>(&body)?;
    Ok(Some(body))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn inline_json_passes_through() {
        assert_eq!(
            read_data(Some(r#"{"cmd":"restart"}"#)).unwrap().as_deref(),
            Some(r#"{"cmd":"restart"}"#)
        );
        assert_eq!(read_data(None).unwrap(), None);
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(read_data(Some("{nope")), Err(CliError::Json(_))));
    }
}
