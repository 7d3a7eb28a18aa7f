use super::behavior::Behavior;
use super::error::QueryError;
use super::variable::Variable;
use crate::clock::Span;
use crate::track::Direction;
use crate::track::Distance;
use crate::track::DistanceChange;
use crate::track::MutualDirection;
use crate::track::Speed;
use crate::Delta;

/// parse a textual behavior query into a behavior tree.
///
/// the language is a case-insensitive infix grammar. actions name one or
/// more actors and a movement/distance/direction phrase, optionally
/// followed by a time bound; actions compose with NOT, AND, OR, labeled
/// groups and THEN, binding in that order from tight to loose.
pub fn parse(text: &str) -> Result<Behavior, QueryError> {
    let tokens = lex(text)?;
    let mut parser = Parser { tokens, cursor: 0 };
    let behavior = parser.sequence()?;
    match parser.peek() {
        None => Ok(behavior),
        Some(_) => Err(parser.unexpected()),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Then,
    Must,
    Is,
    Walk,
    Run,
    Stand,
    Move,
    Straight,
    Left,
    Right,
    Opposite,
    Towards,
    From,
    With,
    Parallel,
    Independent,
    Counter,
    Far,
    Near,
    Adjacent,
    AtLeast,
    AtMost,
    Approx,
    Between,
    For,
    And,
    Or,
    Not,
    Unit(i64),
    EachOther,
    LParen,
    RParen,
    Number(i64),
    Label(String),
    Actor(String),
}

/// multi-word keywords, longest phrase first so greedy matching wins
const PHRASES: &[(&[&str], Token)] = &[
    (&["independent", "of", "each", "other"], Token::Independent),
    (&["to", "the", "left", "of"], Token::Left),
    (&["to", "the", "right", "of"], Token::Right),
    (&["in", "the", "same", "direction"], Token::Parallel),
    (&["in", "opposite", "directions"], Token::Counter),
    (&["to", "the", "left"], Token::Left),
    (&["to", "the", "right"], Token::Right),
    (&["at", "least"], Token::AtLeast),
    (&["at", "most"], Token::AtMost),
    (&["away", "from"], Token::From),
    (&["each", "other"], Token::EachOther),
    (&["far", "from"], Token::Far),
    (&["near", "to"], Token::Near),
    (&["adjacent", "to"], Token::Adjacent),
    (&["in", "parallel"], Token::Parallel),
    (&["opposite", "to"], Token::Opposite),
    (&["do", "not"], Token::Not),
    (&["does", "not"], Token::Not),
    (&["left", "of"], Token::Left),
    (&["right", "of"], Token::Right),
    (&["then"], Token::Then),
    (&["must"], Token::Must),
    (&["is"], Token::Is),
    (&["are"], Token::Is),
    (&["be"], Token::Is),
    (&["walk"], Token::Walk),
    (&["walks"], Token::Walk),
    (&["run"], Token::Run),
    (&["runs"], Token::Run),
    (&["stand"], Token::Stand),
    (&["stands"], Token::Stand),
    (&["move"], Token::Move),
    (&["moves"], Token::Move),
    (&["straight"], Token::Straight),
    (&["left"], Token::Left),
    (&["right"], Token::Right),
    (&["opposite"], Token::Opposite),
    (&["towards"], Token::Towards),
    (&["from"], Token::From),
    (&["with"], Token::With),
    (&["alongside"], Token::With),
    (&["independently"], Token::Independent),
    (&["near"], Token::Near),
    (&["and"], Token::And),
    (&["or"], Token::Or),
    (&["not"], Token::Not),
    (&["for"], Token::For),
    (&["between"], Token::Between),
    (&["approximately"], Token::Approx),
    (&["about"], Token::Approx),
    (&["cca"], Token::Approx),
    (&["seconds"], Token::Unit(1)),
    (&["minutes"], Token::Unit(60)),
    (&["hours"], Token::Unit(3600)),
];

enum Raw {
    Sym(Token, usize),
    Word { lower: String, exact: String, position: usize },
}

fn lex(text: &str) -> Result<Vec<(Token, usize)>, QueryError> {
    let mut raw = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' | ',' | '.' => i += 1,
            '(' => {
                raw.push(Raw::Sym(Token::LParen, i));
                i += 1;
            }
            ')' => {
                raw.push(Raw::Sym(Token::RParen, i));
                i += 1;
            }
            '[' => {
                let close = text[i..]
                    .find(']')
                    .ok_or_else(|| QueryError::new("unclosed label", i))?;
                let label = text[i + 1..i + close].trim().to_string();
                raw.push(Raw::Sym(Token::Label(label), i));
                i += close + 1;
            }
            '0'..='9' => {
                let mut j = i;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                let number = text[i..j]
                    .parse::<i64>()
                    .map_err(|_| QueryError::new("number out of range", i))?;
                raw.push(Raw::Sym(Token::Number(number), i));
                i = j;
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut j = i;
                while j < bytes.len()
                    && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_')
                {
                    j += 1;
                }
                let exact = text[i..j].to_string();
                raw.push(Raw::Word {
                    lower: exact.to_lowercase(),
                    exact,
                    position: i,
                });
                i = j;
            }
            _ => return Err(QueryError::new(format!("illegal character '{}'", c), i)),
        }
    }

    // phrase-match the word stream against the keyword table
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < raw.len() {
        match &raw[i] {
            Raw::Sym(token, position) => {
                tokens.push((token.clone(), *position));
                i += 1;
            }
            Raw::Word { position, exact, .. } => {
                let matched = PHRASES.iter().find(|(phrase, _)| {
                    phrase.iter().enumerate().all(|(k, word)| {
                        matches!(raw.get(i + k), Some(Raw::Word { lower, .. }) if lower == word)
                    })
                });
                match matched {
                    Some((phrase, token)) => {
                        tokens.push((token.clone(), *position));
                        i += phrase.len();
                    }
                    None => {
                        tokens.push((Token::Actor(exact.clone()), *position));
                        i += 1;
                    }
                }
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(t, _)| t)
    }
    fn peek_ahead(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.cursor + offset).map(|(t, _)| t)
    }
    fn position(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .or(self.tokens.last())
            .map(|(_, p)| *p)
            .unwrap_or(0)
    }
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|(t, _)| t.clone());
        self.cursor += token.is_some() as usize;
        token
    }
    fn eat(&mut self, token: &Token) -> bool {
        let hit = self.peek() == Some(token);
        self.cursor += hit as usize;
        hit
    }
    fn expect(&mut self, token: &Token, what: &str) -> Result<(), QueryError> {
        match self.eat(token) {
            true => Ok(()),
            false => Err(QueryError::new(format!("expected {}", what), self.position())),
        }
    }
    fn unexpected(&self) -> QueryError {
        match self.tokens.get(self.cursor) {
            Some((token, position)) => {
                QueryError::new(format!("unexpected token {:?}", token), *position)
            }
            None => QueryError::new("unexpected end of query", self.position()),
        }
    }

    /// behavior ::= labeled (THEN labeled)*
    fn sequence(&mut self) -> Result<Behavior, QueryError> {
        let mut parts = vec![self.labeled()?];
        while self.eat(&Token::Then) {
            parts.push(self.labeled()?);
        }
        match parts.len() {
            1 => Ok(parts.swap_remove(0)),
            _ => Ok(Behavior::then(parts)),
        }
    }

    /// labeled ::= LABEL labeled | disjunction
    fn labeled(&mut self) -> Result<Behavior, QueryError> {
        if let Some(Token::Label(_)) = self.peek() {
            let Some(Token::Label(label)) = self.advance() else {
                unreachable!("peeked label");
            };
            let mut behavior = self.labeled()?;
            behavior.name = Some(label);
            return Ok(behavior);
        }
        self.disjunction()
    }

    /// disjunction ::= conjunction (OR conjunction)*
    fn disjunction(&mut self) -> Result<Behavior, QueryError> {
        let mut parts = vec![self.conjunction()?];
        while self.eat(&Token::Or) {
            parts.push(self.conjunction()?);
        }
        match parts.len() {
            1 => Ok(parts.swap_remove(0)),
            _ => Ok(Behavior::any(parts)),
        }
    }

    /// conjunction ::= unary (AND unary)*
    fn conjunction(&mut self) -> Result<Behavior, QueryError> {
        let mut parts = vec![self.unary()?];
        while self.eat(&Token::And) {
            parts.push(self.unary()?);
        }
        match parts.len() {
            1 => Ok(parts.swap_remove(0)),
            _ => Ok(Behavior::all(parts)),
        }
    }

    /// unary ::= NOT unary | LPAR behavior RPAR bounds? | action bounds?
    fn unary(&mut self) -> Result<Behavior, QueryError> {
        if self.eat(&Token::Not) {
            return Ok(Behavior::not(self.unary()?));
        }
        if self.eat(&Token::LParen) {
            let inner = self.sequence()?;
            self.expect(&Token::RParen, "closing parenthesis")?;
            return Ok(self.bounded(inner)?);
        }
        let action = self.action()?;
        self.bounded(action)
    }

    /// wrap a behavior in a time restriction when bounds follow
    fn bounded(&mut self, behavior: Behavior) -> Result<Behavior, QueryError> {
        match self.eat(&Token::For) {
            false => Ok(behavior),
            true => {
                let span = self.bounds()?;
                Ok(Behavior::within(behavior, span))
            }
        }
    }

    /// bounds ::= AT_LEAST span | AT_MOST span | APPROX span
    ///          | BETWEEN span AND span | BETWEEN n AND n unit
    fn bounds(&mut self) -> Result<Span, QueryError> {
        if self.eat(&Token::AtLeast) {
            return Ok(Span::at_least(self.span()?));
        }
        if self.eat(&Token::AtMost) {
            return Ok(Span::at_most(self.span()?));
        }
        if self.eat(&Token::Approx) {
            let delta = self.span()?;
            let ms = delta.num_milliseconds() as f64;
            return Ok(Span::new(
                Delta::milliseconds((ms * 0.8) as i64),
                Delta::milliseconds((ms * 1.2) as i64),
            ));
        }
        if self.eat(&Token::Between) {
            let floor = self.number()?;
            if let Some(Token::Unit(_)) = self.peek() {
                let floor = floor * self.unit()?;
                self.expect(&Token::And, "'and' between bounds")?;
                let ceiling = self.span()?;
                return Ok(Span::new(Delta::seconds(floor), ceiling));
            }
            self.expect(&Token::And, "'and' between bounds")?;
            let ceiling = self.number()?;
            let unit = self.unit()?;
            return Ok(Span::new(
                Delta::seconds(floor * unit),
                Delta::seconds(ceiling * unit),
            ));
        }
        Err(self.unexpected())
    }

    /// span ::= NUMBER unit
    fn span(&mut self) -> Result<Delta, QueryError> {
        let number = self.number()?;
        let unit = self.unit()?;
        Ok(Delta::seconds(number * unit))
    }
    fn number(&mut self) -> Result<i64, QueryError> {
        match self.peek() {
            Some(Token::Number(_)) => {
                let Some(Token::Number(n)) = self.advance() else {
                    unreachable!("peeked number");
                };
                Ok(n)
            }
            _ => Err(QueryError::new("expected a number", self.position())),
        }
    }
    fn unit(&mut self) -> Result<i64, QueryError> {
        match self.peek() {
            Some(Token::Unit(_)) => {
                let Some(Token::Unit(seconds)) = self.advance() else {
                    unreachable!("peeked unit");
                };
                Ok(seconds)
            }
            _ => Err(QueryError::new("expected a time unit", self.position())),
        }
    }

    /// action ::= actors MUST? NOT? verb-phrase
    fn action(&mut self) -> Result<Behavior, QueryError> {
        let start = self.position();
        let actors = self.actors()?;
        let must = self.eat(&Token::Must);
        let negated = self.eat(&Token::Not);
        let mut behavior = match self.peek() {
            Some(Token::Stand) => {
                self.advance();
                self.standing(&actors, start)?
            }
            Some(Token::Is) => {
                if negated {
                    return Err(self.unexpected());
                }
                self.advance();
                let negated = self.eat(&Token::Not);
                let behavior = self.proximate(&actors, start)?;
                let behavior = match negated {
                    true => Behavior::not(behavior),
                    false => behavior,
                };
                return Ok(match must {
                    true => Behavior::must(behavior),
                    false => behavior,
                });
            }
            Some(Token::Walk | Token::Run | Token::Move) => {
                let speeds = self.speeds()?;
                self.moving(&actors, speeds, start)?
            }
            _ => return Err(self.unexpected()),
        };
        if negated {
            behavior = Behavior::not(behavior);
        }
        if must {
            behavior = Behavior::must(behavior);
        }
        Ok(behavior)
    }

    /// STAND, optionally followed by a relative distance and a target
    fn standing(&mut self, actors: &[Variable], start: usize) -> Result<Behavior, QueryError> {
        let standing = Behavior::state(actors.to_vec(), Some(Speed::Stand), None);
        let Some(distance) = self.distance() else {
            return Ok(standing);
        };
        let who = self.companions(actors, start)?;
        Ok(Behavior::all(vec![
            standing,
            Behavior::mutual(who, None, None, Some(distance)),
        ]))
    }

    /// IS [NOT] relative_distance (ACTOR | EACH_OTHER)
    fn proximate(&mut self, actors: &[Variable], start: usize) -> Result<Behavior, QueryError> {
        let Some(distance) = self.distance() else {
            return Err(self.unexpected());
        };
        let who = self.companions(actors, start)?;
        Ok(Behavior::mutual(who, None, None, Some(distance)))
    }

    /// the moving verb phrases: bare speed, absolute direction with an
    /// optional target, mutual direction, or relative direction with a
    /// target or "each other"
    fn moving(
        &mut self,
        actors: &[Variable],
        speeds: Vec<Speed>,
        start: usize,
    ) -> Result<Behavior, QueryError> {
        // absolute direction
        if let Some(direction) = self.direction() {
            if let Some(Token::Actor(_)) = self.peek() {
                let target = self.actor()?;
                let mut parts = vec![Self::pacing(actors, &speeds, None)];
                parts.extend(actors.iter().map(|actor| {
                    Behavior::directed(actor.clone(), target.clone(), None, Some(direction))
                }));
                return Ok(Behavior::all(parts));
            }
            return Ok(Self::pacing(actors, &speeds, Some(direction)));
        }
        // mutual direction
        if let Some(mutual) = self.mutual() {
            if actors.len() <= 1 {
                return Err(QueryError::new(
                    "multiple actors required in a mutual-direction action",
                    start,
                ));
            }
            return Ok(Behavior::all(vec![
                Self::pacing(actors, &speeds, None),
                Behavior::mutual(actors.to_vec(), None, Some(mutual), None),
            ]));
        }
        // relative direction against a target or each other
        if let Some((intended, relative)) = self.relation() {
            if self.eat(&Token::EachOther) {
                if actors.len() <= 1 {
                    return Err(QueryError::new(
                        "multiple actors required in an 'each other' action",
                        start,
                    ));
                }
                return Ok(Behavior::all(vec![
                    Self::pacing(actors, &speeds, None),
                    Behavior::mutual(actors.to_vec(), Some(intended), None, None),
                ]));
            }
            let target = self.actor()?;
            let mut parts = vec![Self::pacing(actors, &speeds, None)];
            parts.extend(actors.iter().map(|actor| {
                Behavior::directed(actor.clone(), target.clone(), Some(intended), relative)
            }));
            return Ok(Behavior::all(parts));
        }
        Ok(Self::pacing(actors, &speeds, None))
    }

    /// a speed expectation, disjoined over the admissible speeds
    fn pacing(actors: &[Variable], speeds: &[Speed], direction: Option<Direction>) -> Behavior {
        match speeds {
            [speed] => Behavior::state(actors.to_vec(), Some(*speed), direction),
            _ => Behavior::any(
                speeds
                    .iter()
                    .map(|s| Behavior::state(actors.to_vec(), Some(*s), direction))
                    .collect(),
            ),
        }
    }

    /// actors ::= ACTOR ((AND)? ACTOR)*
    fn actors(&mut self) -> Result<Vec<Variable>, QueryError> {
        let mut actors = vec![self.actor()?];
        loop {
            match (self.peek(), self.peek_ahead(1)) {
                (Some(Token::Actor(_)), _) => actors.push(self.actor()?),
                (Some(Token::And), Some(Token::Actor(_))) => {
                    self.advance();
                    actors.push(self.actor()?);
                }
                _ => break,
            }
        }
        Ok(actors)
    }

    fn actor(&mut self) -> Result<Variable, QueryError> {
        match self.peek() {
            Some(Token::Actor(_)) => {
                let Some(Token::Actor(name)) = self.advance() else {
                    unreachable!("peeked actor");
                };
                Ok(Variable(name))
            }
            _ => Err(QueryError::new("expected an actor name", self.position())),
        }
    }

    /// extend the actor list with a named target, or keep it for "each
    /// other", which needs at least two actors to relate
    fn companions(&mut self, actors: &[Variable], start: usize) -> Result<Vec<Variable>, QueryError> {
        if self.eat(&Token::EachOther) {
            if actors.len() <= 1 {
                return Err(QueryError::new(
                    "multiple actors required in an 'each other' action",
                    start,
                ));
            }
            return Ok(actors.to_vec());
        }
        let target = self.actor()?;
        let mut who = actors.to_vec();
        who.push(target);
        Ok(who)
    }

    fn speeds(&mut self) -> Result<Vec<Speed>, QueryError> {
        match self.advance() {
            Some(Token::Walk) => Ok(vec![Speed::Walk]),
            Some(Token::Run) => Ok(vec![Speed::Run]),
            Some(Token::Move) => Ok(vec![Speed::Walk, Speed::Run]),
            _ => Err(self.unexpected()),
        }
    }
    fn direction(&mut self) -> Option<Direction> {
        let direction = match self.peek()? {
            Token::Straight => Direction::Straight,
            Token::Left => Direction::Left,
            Token::Right => Direction::Right,
            Token::Opposite => Direction::Opposite,
            _ => return None,
        };
        self.advance();
        Some(direction)
    }
    fn mutual(&mut self) -> Option<MutualDirection> {
        let mutual = match self.peek()? {
            Token::Parallel => MutualDirection::Parallel,
            Token::Independent => MutualDirection::Independent,
            Token::Counter => MutualDirection::Opposite,
            _ => return None,
        };
        self.advance();
        Some(mutual)
    }
    fn relation(&mut self) -> Option<(DistanceChange, Option<Direction>)> {
        let relation = match self.peek()? {
            Token::Towards => (DistanceChange::Decreasing, Some(Direction::Straight)),
            Token::From => (DistanceChange::Increasing, Some(Direction::Opposite)),
            Token::With => (DistanceChange::Constant, None),
            _ => return None,
        };
        self.advance();
        Some(relation)
    }
    fn distance(&mut self) -> Option<Distance> {
        let distance = match self.peek()? {
            Token::Far => Distance::Far,
            Token::Near => Distance::Near,
            Token::Adjacent => Distance::Adjacent,
            _ => return None,
        };
        self.advance();
        Some(distance)
    }
}
