use super::*;

#[test]
fn test_execution_context_string() {
    let tests = vec![
        (ExecutionContext::Control, "control"),
        (ExecutionContext::Network, "network"),
        (ExecutionContext::Presentation, "presentation"),
    ];

    for (context, expected_string) in tests {
        assert_eq!(context.to_string(), expected_string);
    }
}

#[test]
fn test_unowned_thread_is_control() {
    assert_eq!(ExecutionContext::current(), ExecutionContext::Control);
    assert!(ensure_context(ExecutionContext::Control).is_ok());
    assert_eq!(
        ensure_context(ExecutionContext::Network),
        Err(Error::ErrWrongExecutionContext {
            expected: ExecutionContext::Network,
            actual: ExecutionContext::Control,
        })
    );
}

#[tokio::test]
async fn test_dispatch_runs_on_context_thread() -> Result<()> {
    let thread = ContextThread::spawn(ExecutionContext::Network, "test-network")?;

    let (context, thread_name) = thread
        .dispatch(|| async {
            (
                ExecutionContext::current(),
                std::thread::current().name().map(|s| s.to_owned()),
            )
        })?
        .wait()
        .await?;

    assert_eq!(context, ExecutionContext::Network);
    assert_eq!(thread_name.as_deref(), Some("test-network"));
    assert!(ensure_context(ExecutionContext::Control).is_ok());

    Ok(())
}

#[tokio::test]
async fn test_dispatch_preserves_start_order() -> Result<()> {
    let thread = ContextThread::spawn(ExecutionContext::Network, "test-order")?;
    let order = std::sync::Arc::new(std::sync::Mutex::new(vec![]));

    let mut completions = vec![];
    for i in 0..5 {
        let order = std::sync::Arc::clone(&order);
        completions.push(thread.dispatch(move || async move {
            order.lock().unwrap().push(i);
        })?);
    }
    for c in completions {
        c.wait().await?;
    }

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);

    Ok(())
}

#[tokio::test]
async fn test_dispatch_after_shutdown() -> Result<()> {
    let thread = ContextThread::spawn(ExecutionContext::Presentation, "test-shutdown")?;
    thread.shutdown();

    assert!(thread.is_shutdown());
    assert!(matches!(
        thread.dispatch(|| async {}),
        Err(Error::ErrContextThreadShutdown)
    ));

    Ok(())
}
