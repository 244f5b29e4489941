use std::sync::OnceLock;

/// Returns the handle of the ambient tokio runtime, or of a process-wide
/// fallback runtime when the caller is not inside one.
///
/// UI render loops are usually plain threads, so the fallback is the common
/// path there.
pub fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("roster-worker-global")
			.build()
			.expect("failed to build roster-worker global tokio runtime")
	});
	runtime.handle().clone()
}
