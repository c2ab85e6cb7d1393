use std::fmt;

/// A prompt submitted to the inference session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PoemPrompt<'a> {
    /// A terrible poem about the given subject.
    Subject(&'a str),
    /// A roast of the attached image.
    Roast,
}

impl<'a> fmt::Display for PoemPrompt<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoemPrompt::Subject(subject) => write!(
                fmt,
                "Write a single verse, terrible poem about the following subject: {subject}. \
                 It should be exactly 4 lines long and it should at least attempt to rhyme. \
                 It should be intentionally terrible, with bonus points for some forced or \
                 awkward rhymes, clunky meter, melodrama, overly flowery and pretentious \
                 language, silly imagery, or factual inaccuracy.\n\
                 Respond only with the 4 lines of the poem. Do not include any other text."
            ),
            PoemPrompt::Roast => write!(
                fmt,
                "Roast me! Be ruthless, savage and above all very funny.\n\
                 Give your answer as a 4 line poem.\n\
                 Respond only with the 4 lines of the poem. Do not include any other text."
            ),
        }
    }
}
