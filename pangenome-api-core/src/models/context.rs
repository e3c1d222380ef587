record! {
    /// An entry of the call stack forwarded to the server.
    pub struct MethodCall / MethodCallBuilder {
        time: String = "time",
        method: String = "method",
        job_id: String = "job_id",
    }
}

record! {
    /// Optional per-call context sent alongside the parameters.
    ///
    /// The pinned service version travels here as `service_ver`.
    pub struct RpcContext / RpcContextBuilder {
        call_stack: Vec<MethodCall> = "call_stack",
        run_id: String = "run_id",
        service_ver: String = "service_ver",
    }
}

impl RpcContext {
    pub fn is_empty(&self) -> bool {
        self.call_stack.is_none()
            && self.run_id.is_none()
            && self.service_ver.is_none()
            && self.additional_properties.is_empty()
    }
}
