use url::Url;

/// The image currently enlarged in the overlay viewer, if any.
///
/// Independent of the request status: a new submission does not close it and
/// closing it never touches the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageViewer {
    selected: Option<Url>,
}

impl ImageViewer {
    pub fn open(&mut self, url: Url) {
        self.selected = Some(url);
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Url> {
        self.selected.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }
}
