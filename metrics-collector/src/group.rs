use indexmap::IndexMap;

use metrics_model::Labels;

/// Monitored objects of one kind that share a metric name and help text.
///
/// Each object is keyed by the label set that tells it apart from its siblings.  Objects are kept
/// in insertion order, which makes the families built from a group come out in a stable order.
#[derive(Clone, Debug)]
pub struct LabeledGroup<T> {
    name: String,
    help: String,
    objects: IndexMap<Labels, T>,
}

impl<T> LabeledGroup<T> {
    /// Creates an empty [`LabeledGroup`].
    pub fn new<N, H>(name: N, help: H) -> LabeledGroup<T>
    where
        N: Into<String>,
        H: Into<String>,
    {
        LabeledGroup { name: name.into(), help: help.into(), objects: IndexMap::new() }
    }

    /// Creates a [`LabeledGroup`] from label/object pairs.
    ///
    /// A repeated label set keeps its first position but takes the last object.
    pub fn from_objects<N, H, I>(name: N, help: H, objects: I) -> LabeledGroup<T>
    where
        N: Into<String>,
        H: Into<String>,
        I: IntoIterator<Item = (Labels, T)>,
    {
        let mut group = LabeledGroup::new(name, help);
        group.objects.extend(objects);
        group
    }

    /// Adds an object under `labels`, returning the object it replaced, if any.
    pub fn insert(&mut self, labels: Labels, object: T) -> Option<T> {
        self.objects.insert(labels, object)
    }

    /// Builder-style variant of [`insert`][LabeledGroup::insert].
    pub fn with(mut self, labels: Labels, object: T) -> Self {
        self.objects.insert(labels, object);
        self
    }

    /// Metric name shared by the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text shared by the group.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Gets the object under `labels`.
    pub fn get(&self, labels: &Labels) -> Option<&T> {
        self.objects.get(labels)
    }

    /// Iterates label sets and objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Labels, &T)> {
        self.objects.iter()
    }

    /// Number of objects in the group.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the group holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Converts every object, keeping names and label sets.
    ///
    /// Useful for erasing a concrete object type into a shared trait object.
    pub fn map<U, F>(self, mut f: F) -> LabeledGroup<U>
    where
        F: FnMut(T) -> U,
    {
        LabeledGroup {
            name: self.name,
            help: self.help,
            objects: self.objects.into_iter().map(|(labels, object)| (labels, f(object))).collect(),
        }
    }
}
