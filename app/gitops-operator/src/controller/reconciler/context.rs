use gitops_core::resources::console_link::ConsoleLinkRelease;

pub struct ReconcilerContext<C> {
    pub client: C,
    pub release: ConsoleLinkRelease,
}
